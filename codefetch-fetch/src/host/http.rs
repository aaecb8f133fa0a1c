//! Bounded HTTP fetcher.
//!
//! Wraps a `reqwest` client configured for raw-file retrieval:
//! - No caching headers, no cookie store, redirects followed
//! - A single deadline covering connect, headers and body
//! - A byte ceiling enforced while streaming, never after

use async_trait::async_trait;
use codefetch_core::{CanonicalLocation, FetchLimits, FetchOutcome, TransportCause};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, redirect};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;
use crate::fetcher::SourceFetcher;

/// User agent string for codefetch.
pub const DEFAULT_USER_AGENT: &str = concat!("codefetch/", env!("CARGO_PKG_VERSION"));

/// Preference for plain text over anything a forge might render.
const ACCEPT: &str = "text/plain, application/octet-stream;q=0.9, */*;q=0.8";

/// Upper bound on how much of an error body is kept.
const ERROR_BODY_LIMIT: u64 = 64 * 1024;

// ============================================================================
// HTTP Fetcher
// ============================================================================

/// [`SourceFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default user agent.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a fetcher sending the given `User-Agent`.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        let inner = Client::builder()
            .user_agent(HeaderValue::from_str(user_agent)?)
            .default_headers(headers)
            .redirect(redirect::Policy::default())
            .build()?;

        Ok(Self { inner })
    }

    /// Runs the request without a deadline. The caller applies one.
    async fn attempt(&self, url: &Url, max_bytes: u64) -> Result<FetchOutcome, reqwest::Error> {
        let mut response = self.inner.get(url.clone()).send().await?;
        let status = response.status();
        let content_type = content_type(&response);
        debug!(status = %status, content_type = %content_type, "Response received");

        if !status.is_success() {
            let (bytes, _) = read_capped(&mut response, ERROR_BODY_LIMIT.min(max_bytes)).await?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return Ok(FetchOutcome::UpstreamError {
                status: status.as_u16(),
                raw_body: parse_error_body(text, &content_type),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > max_bytes {
                debug!(declared, max_bytes, "Declared length over ceiling");
                return Ok(FetchOutcome::TooLarge {
                    limit: max_bytes,
                    observed: declared,
                });
            }
        }

        let (bytes, overflow) = read_capped(&mut response, max_bytes).await?;
        if let Some(observed) = overflow {
            debug!(observed, max_bytes, "Body crossed ceiling while streaming");
            return Ok(FetchOutcome::TooLarge {
                limit: max_bytes,
                observed,
            });
        }

        Ok(FetchOutcome::Success {
            body: String::from_utf8_lossy(&bytes).into_owned(),
            content_type,
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    fn id(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, limits), fields(url = %location))]
    async fn fetch(&self, location: &CanonicalLocation, limits: FetchLimits) -> FetchOutcome {
        let request = self.attempt(location.url(), limits.max_bytes);
        match tokio::time::timeout(limits.timeout, request).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => {
                let cause = transport_cause(&error);
                debug!(error = %error, cause = %cause, "Transport error");
                FetchOutcome::transport(cause)
            }
            Err(_) => {
                debug!(timeout = ?limits.timeout, "Request deadline reached");
                FetchOutcome::transport(TransportCause::Abort)
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase()
}

/// Reads the body chunk by chunk, stopping once `limit` is crossed.
///
/// Returns the bytes read up to `limit` and, on overflow, the running
/// total at the chunk that crossed it.
async fn read_capped(
    response: &mut Response,
    limit: u64,
) -> Result<(Vec<u8>, Option<u64>), reqwest::Error> {
    let mut body = Vec::new();
    let mut total: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        total = total.saturating_add(chunk.len() as u64);
        if total > limit {
            let room = usize::try_from(limit).unwrap_or(usize::MAX).saturating_sub(body.len());
            body.extend_from_slice(&chunk[..room.min(chunk.len())]);
            return Ok((body, Some(total)));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((body, None))
}

/// JSON when declared and parseable, otherwise the text itself.
fn parse_error_body(text: String, content_type: &str) -> Value {
    if content_type.contains("json") {
        if let Ok(value) = serde_json::from_str(&text) {
            return value;
        }
    }
    Value::String(text)
}

/// Maps a reqwest failure onto the transport taxonomy.
fn transport_cause(error: &reqwest::Error) -> TransportCause {
    if error.is_timeout() {
        TransportCause::Abort
    } else if error.is_connect() || error.is_request() {
        TransportCause::Network
    } else {
        TransportCause::Other
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_with_default_agent() {
        assert!(HttpFetcher::new().is_ok());
        assert!(DEFAULT_USER_AGENT.starts_with("codefetch/"));
    }

    #[test]
    fn test_rejects_invalid_user_agent() {
        let result = HttpFetcher::with_user_agent("bad\nagent");
        assert!(matches!(result, Err(FetchError::InvalidHeader(_))));
    }

    #[test]
    fn test_parse_error_body() {
        assert_eq!(
            parse_error_body(r#"{"error":"x"}"#.to_string(), "application/json; charset=utf-8"),
            json!({ "error": "x" })
        );
        assert_eq!(
            parse_error_body(r#"{"error":"x"}"#.to_string(), "text/plain"),
            json!(r#"{"error":"x"}"#)
        );
        assert_eq!(
            parse_error_body("not json".to_string(), "application/json"),
            json!("not json")
        );
    }
}
