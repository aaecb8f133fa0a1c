//! Retry orchestration around fetch and classification.
//!
//! [`fetch_with_retry`] drives the attempt loop:
//!
//! ```text
//! Attempting(n) --ok--------------------------> Success
//!               --transient, n < max_attempts--> RetryScheduled(n+1) --sleep--> Attempting(n+1)
//!               --transient, exhausted-------> Failed (generic overload message)
//!               --terminal-------------------> Failed
//! ```
//!
//! [`Retriever`] wires the forge registry, a fetcher and the settings into
//! the `{ code }` / `{ error }` boundary.

use codefetch_core::{
    CanonicalLocation, ClassifiedResult, CodeEnvelope, CoreError, FetchLimits, FetchOutcome,
    RejectReason, Rejection, RetrievedSource, SourceInput, SourceReference,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::cancel::CancelToken;
use crate::classify::classify;
use crate::error::FetchError;
use crate::fetcher::SourceFetcher;
use crate::forge::ForgeRegistry;
use crate::host::HttpFetcher;
use crate::retry::RetryPolicy;
use crate::settings::RetrievalSettings;

// ============================================================================
// Attempt Record
// ============================================================================

/// Record of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Attempt number (1-based).
    pub attempt: u32,
    /// Backoff slept before this attempt.
    pub delay_before: Duration,
    /// Outcome label from the fetcher.
    pub outcome: &'static str,
    /// Rejection class, `None` on success.
    pub reason: Option<RejectReason>,
    /// How long the fetch took.
    pub duration: Duration,
}

impl AttemptRecord {
    /// Returns true if the attempt produced code.
    pub fn is_success(&self) -> bool {
        self.reason.is_none()
    }
}

// ============================================================================
// Retrieval Report
// ============================================================================

/// A usable body with the content type it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// Source text. Never empty, never an HTML document.
    pub code: String,
    /// Lowercased content type.
    pub content_type: String,
}

/// The outcome of one orchestrated retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalReport {
    /// The body or the final rejection.
    pub result: Result<FetchedBody, Rejection>,
    /// All attempts made, in order.
    pub attempts: Vec<AttemptRecord>,
    /// Total wall time, backoff included.
    pub duration: Duration,
}

impl RetrievalReport {
    /// Returns true if the retrieval produced code.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the number of attempts made.
    pub fn attempts_count(&self) -> u32 {
        u32::try_from(self.attempts.len()).unwrap_or(u32::MAX)
    }

    /// Returns the number of retries made.
    pub fn retries(&self) -> u32 {
        self.attempts_count().saturating_sub(1)
    }

    /// Returns the final rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        self.result.as_ref().err()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Fetches `location` until it yields code, fails terminally, or runs out
/// of retries.
///
/// Never fails: every path ends in a [`RetrievalReport`]. The backoff sleep
/// and the in-flight fetch both yield to `cancel`.
#[instrument(skip_all, fields(url = %location, fetcher = fetcher.id()))]
pub async fn fetch_with_retry(
    fetcher: &dyn SourceFetcher,
    location: &CanonicalLocation,
    limits: FetchLimits,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> RetrievalReport {
    let start = Instant::now();
    let mut state = policy.initial_state();
    let mut attempts = Vec::new();
    let mut delay_before = Duration::ZERO;

    let finish = |result: Result<FetchedBody, Rejection>, attempts: Vec<AttemptRecord>| {
        RetrievalReport {
            result,
            attempts,
            duration: start.elapsed(),
        }
    };

    loop {
        if cancel.is_cancelled() {
            info!("Retrieval cancelled");
            return finish(Err(Rejection::cancelled()), attempts);
        }

        debug!(attempt = state.attempt, max_attempts = state.max_attempts, "Fetching");
        let attempt_start = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(attempt = state.attempt, "Retrieval cancelled mid-fetch");
                return finish(Err(Rejection::cancelled()), attempts);
            }
            outcome = fetcher.fetch(location, limits) => outcome,
        };
        let duration = attempt_start.elapsed();

        let classified = classify(&outcome);
        attempts.push(AttemptRecord {
            attempt: state.attempt,
            delay_before,
            outcome: outcome.label(),
            reason: classified.rejection().map(|r| r.reason),
            duration,
        });

        let rejection = match classified {
            ClassifiedResult::Ok { code } => {
                info!(attempt = state.attempt, bytes = code.len(), "Retrieved source");
                let content_type = match outcome {
                    FetchOutcome::Success { content_type, .. } => content_type,
                    _ => String::new(),
                };
                return finish(Ok(FetchedBody { code, content_type }), attempts);
            }
            ClassifiedResult::Rejected(rejection) => rejection,
        };

        if !policy.should_retry(&outcome, &rejection) {
            debug!(reason = %rejection.reason, message = %rejection.message, "Terminal rejection");
            return finish(Err(rejection), attempts);
        }

        let Some(delay) = state.advance() else {
            warn!(
                attempts = state.attempt,
                reason = %rejection.reason,
                "Retries exhausted"
            );
            return finish(Err(rejection.into_overloaded()), attempts);
        };

        warn!(
            next_attempt = state.attempt,
            delay = ?delay,
            reason = %rejection.reason,
            status = ?rejection.status,
            "Transient failure, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("Retrieval cancelled during backoff");
                return finish(Err(Rejection::cancelled()), attempts);
            }
            () = tokio::time::sleep(delay) => {}
        }
        delay_before = delay;
    }
}

// ============================================================================
// Retriever
// ============================================================================

/// A [`RetrievedSource`] or the final rejection, with the attempt trail.
#[derive(Debug, Clone)]
pub struct SourceRetrieval {
    /// The source with its hints, or why there is none.
    pub result: Result<RetrievedSource, Rejection>,
    /// All attempts made, in order. Empty when the URL was rejected.
    pub attempts: Vec<AttemptRecord>,
}

/// Entry point tying normalization, fetching and retries together.
#[derive(Clone)]
pub struct Retriever {
    fetcher: Arc<dyn SourceFetcher>,
    settings: RetrievalSettings,
}

impl Retriever {
    /// Creates a retriever backed by an [`HttpFetcher`].
    pub fn new(settings: RetrievalSettings) -> Result<Self, FetchError> {
        settings.validate()?;
        let fetcher = HttpFetcher::with_user_agent(&settings.user_agent)?;
        Ok(Self::with_fetcher(settings, Arc::new(fetcher)))
    }

    /// Creates a retriever with a custom fetcher.
    pub fn with_fetcher(settings: RetrievalSettings, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self { fetcher, settings }
    }

    /// Normalizes a URL, mapping failures onto the rejection taxonomy.
    pub fn resolve(&self, url: &str) -> Result<CanonicalLocation, Rejection> {
        if url.trim().is_empty() {
            return Err(Rejection::missing_url());
        }
        ForgeRegistry::builtin().normalize(url).map_err(|e: CoreError| {
            debug!(error = %e, "Rejected input");
            Rejection::invalid_url()
        })
    }

    /// Runs the retry loop against an already-normalized location.
    pub async fn retrieve(&self, location: &CanonicalLocation, cancel: &CancelToken) -> RetrievalReport {
        fetch_with_retry(
            self.fetcher.as_ref(),
            location,
            self.settings.limits(),
            &self.settings.retry_policy(),
            cancel,
        )
        .await
    }

    /// Retrieves a URL, keeping the per-attempt records.
    #[instrument(skip(self, cancel))]
    pub async fn retrieve_detailed(&self, url: &str, cancel: &CancelToken) -> SourceRetrieval {
        let location = match self.resolve(url) {
            Ok(location) => location,
            Err(rejection) => {
                return SourceRetrieval {
                    result: Err(rejection),
                    attempts: Vec::new(),
                };
            }
        };
        info!(url = %location, forge = %location.forge(), "Fetching");

        // Normalization accepted the input, so it parses.
        let requested = Url::parse(url.trim()).unwrap_or_else(|_| location.url().clone());
        let report = self.retrieve(&location, cancel).await;
        let attempts_count = report.attempts_count();
        let result = report.result.map(|body| {
            RetrievedSource::new(
                body.code,
                &requested,
                location,
                body.content_type,
                attempts_count,
            )
        });

        SourceRetrieval {
            result,
            attempts: report.attempts,
        }
    }

    /// Retrieves a URL, returning the code with its hints and provenance.
    pub async fn retrieve_source(
        &self,
        url: &str,
        cancel: &CancelToken,
    ) -> Result<RetrievedSource, Rejection> {
        self.retrieve_detailed(url, cancel).await.result
    }

    /// Accepts a URL or literal code and answers with the response envelope.
    ///
    /// Input that is not an absolute `http(s)` URL is returned as code
    /// without any network access.
    pub async fn retrieve_code(&self, input: &str, cancel: &CancelToken) -> CodeEnvelope {
        let reference = SourceReference::new(input);
        if reference.is_blank() {
            return Rejection::missing_url().into();
        }
        match reference.resolve_input() {
            SourceInput::Literal(code) => {
                debug!(bytes = code.len(), "Input is literal code");
                CodeEnvelope::code(code)
            }
            SourceInput::Url(url) => self.fetch_code(url.as_str(), cancel).await,
        }
    }

    /// The `fetch-code` endpoint: the `url` parameter must be a URL.
    pub async fn fetch_code_endpoint(&self, url: Option<&str>, cancel: &CancelToken) -> CodeEnvelope {
        match url {
            Some(url) if !url.trim().is_empty() => self.fetch_code(url, cancel).await,
            _ => Rejection::missing_url().into(),
        }
    }

    async fn fetch_code(&self, url: &str, cancel: &CancelToken) -> CodeEnvelope {
        self.retrieve_source(url, cancel)
            .await
            .map(|source| source.code)
            .into()
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("fetcher", &self.fetcher.id())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
