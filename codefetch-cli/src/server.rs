//! HTTP endpoint.
//!
//! `GET /api/fetch-code?url=...` and `POST /api/fetch-code` with
//! `{ "url": "..." }` answer with the `{ code }` / `{ error }` envelope and
//! its status. `GET /health` reports liveness.

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use codefetch_core::CodeEnvelope;
use codefetch_fetch::{CancelToken, Retriever};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared handler state.
pub struct AppState {
    retriever: Retriever,
    cancel: CancelToken,
}

impl AppState {
    /// Creates handler state. Firing `cancel` aborts in-flight retrievals.
    pub fn new(retriever: Retriever, cancel: CancelToken) -> Self {
        Self { retriever, cancel }
    }
}

/// Request shape for both methods. A missing or unparsable body is
/// treated as a missing `url`.
#[derive(Debug, Default, Deserialize)]
pub struct FetchCodeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Build the axum Router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/fetch-code", get(fetch_code_get).post(fetch_code_post))
        .with_state(state)
}

/// Serves until Ctrl-C, then cancels in-flight retrievals and drains.
pub async fn serve(addr: SocketAddr, retriever: Retriever) -> Result<()> {
    let cancel = CancelToken::new();
    let state = Arc::new(AppState::new(retriever, cancel.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancelToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; shut down by killing the process");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
    cancel.cancel();
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn fetch_code_get(
    State(state): State<Arc<AppState>>,
    Query(request): Query<FetchCodeRequest>,
) -> Response {
    fetch_code(&state, request).await
}

async fn fetch_code_post(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = serde_json::from_slice::<FetchCodeRequest>(&body).unwrap_or_else(|e| {
        debug!(error = %e, "Unparsable request body");
        FetchCodeRequest::default()
    });
    fetch_code(&state, request).await
}

async fn fetch_code(state: &AppState, request: FetchCodeRequest) -> Response {
    let envelope = state
        .retriever
        .fetch_code_endpoint(request.url.as_deref(), &state.cancel)
        .await;
    if let CodeEnvelope::Error { error, status } = &envelope {
        debug!(status, error = %error, "fetch-code rejected");
    }
    respond(envelope)
}

fn respond(envelope: CodeEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codefetch_core::{CanonicalLocation, FetchLimits, FetchOutcome};
    use codefetch_fetch::{RetrievalSettings, SourceFetcher};
    use std::time::Duration;

    /// Serves files by path suffix; `/slow` never answers in time.
    struct StubFetcher;

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        fn id(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, location: &CanonicalLocation, _limits: FetchLimits) -> FetchOutcome {
            let path = location.url().path();
            if path.ends_with("/slow.rs") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if path.ends_with("/page") {
                return FetchOutcome::success("<!DOCTYPE html><html></html>", "text/html");
            }
            if path.ends_with("/missing.rs") {
                return FetchOutcome::upstream(404, "Not Found");
            }
            FetchOutcome::success(format!("// {path}\n"), "text/plain")
        }
    }

    async fn spawn_server() -> (String, CancelToken) {
        let settings = RetrievalSettings::default().with_max_retries(0);
        let retriever = Retriever::with_fetcher(settings, Arc::new(StubFetcher));
        let cancel = CancelToken::new();
        let state = Arc::new(AppState::new(retriever, cancel.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        (format!("http://{addr}"), cancel)
    }

    async fn get_json(url: &str) -> (u16, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = spawn_server().await;
        let (status, body) = get_json(&format!("{base}/health")).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_fetch_code() {
        let (base, _) = spawn_server().await;
        let (status, body) = get_json(&format!(
            "{base}/api/fetch-code?url=https://github.com/o/r/blob/main/src/lib.rs"
        ))
        .await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "code": "// /o/r/main/src/lib.rs\n" }));
    }

    #[tokio::test]
    async fn test_post_fetch_code() {
        let (base, _) = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/api/fetch-code"))
            .json(&json!({ "url": "https://gitlab.com/g/p/-/blob/main/app.rb" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "code": "// /g/p/-/raw/main/app.rb\n" }));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_url() {
        let (base, _) = spawn_server().await;

        let (status, body) = get_json(&format!("{base}/api/fetch-code")).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({ "error": "Missing url" }));

        let response = reqwest::Client::new()
            .post(format!("{base}/api/fetch-code"))
            .body("not json at all")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Missing url" }));

        let (status, body) = get_json(&format!("{base}/api/fetch-code?url=nope")).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({ "error": "Invalid URL" }));
    }

    #[tokio::test]
    async fn test_rejections_carry_status() {
        let (base, _) = spawn_server().await;

        let (status, body) =
            get_json(&format!("{base}/api/fetch-code?url=https://example.com/page")).await;
        assert_eq!(status, 415);
        assert!(body["error"].as_str().unwrap().starts_with("Received HTML page"));

        let (status, body) =
            get_json(&format!("{base}/api/fetch-code?url=https://example.com/missing.rs")).await;
        assert_eq!(status, 502);
        assert_eq!(body, json!({ "error": "Upstream error (404) fetching file" }));
    }

    #[tokio::test]
    async fn test_cancel_resolves_in_flight_requests() {
        let (base, cancel) = spawn_server().await;

        let request = tokio::spawn(get_json_owned(format!(
            "{base}/api/fetch-code?url=https://example.com/slow.rs"
        )));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let (status, body) = tokio::time::timeout(Duration::from_secs(5), request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Request cancelled" }));
    }

    async fn get_json_owned(url: String) -> (u16, Value) {
        get_json(&url).await
    }
}
