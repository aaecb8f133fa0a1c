//! The fetcher seam.
//!
//! The orchestrator talks to the network only through [`SourceFetcher`], so
//! tests can script outcomes and other transports can be plugged in.

use async_trait::async_trait;
use codefetch_core::{CanonicalLocation, FetchLimits, FetchOutcome};

/// Performs one bounded fetch attempt.
///
/// ## Implementing a Fetcher
///
/// ```ignore
/// struct FixtureFetcher(String);
///
/// #[async_trait]
/// impl SourceFetcher for FixtureFetcher {
///     fn id(&self) -> &str {
///         "fixture"
///     }
///
///     async fn fetch(&self, _location: &CanonicalLocation, _limits: FetchLimits) -> FetchOutcome {
///         FetchOutcome::success(self.0.clone(), "text/plain")
///     }
/// }
/// ```
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Identifier used in logs (e.g. `"http"`).
    fn id(&self) -> &str;

    /// Fetches `location` once under `limits`.
    ///
    /// Never fails: every transport problem is folded into the outcome.
    /// Implementations must honor `limits.timeout` for the whole request.
    async fn fetch(&self, location: &CanonicalLocation, limits: FetchLimits) -> FetchOutcome;
}
