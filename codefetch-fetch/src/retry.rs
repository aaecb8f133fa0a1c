//! Retry policy for the retrieval orchestrator.

use codefetch_core::{FetchOutcome, RejectReason, Rejection, RetryState};
use std::time::Duration;

use crate::error_message::{mentions_overload, normalize_error_message};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default backoff unit.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(700);

/// How many times, and how long apart, transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculates the delay before retry `n` (1-based).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.initial_state().delay_for_retry(retry)
    }

    /// Fresh retry bookkeeping for one retrieval.
    pub fn initial_state(&self) -> RetryState {
        RetryState::new(self.max_retries, self.base_delay)
    }

    /// Determines whether a rejected attempt is worth retrying.
    ///
    /// Timeouts and network failures always are. Upstream errors are only
    /// for 503, or for another 5xx whose payload reports an overloaded or
    /// unavailable service. Every 4xx is terminal.
    pub fn should_retry(&self, outcome: &FetchOutcome, rejection: &Rejection) -> bool {
        if rejection.reason.is_terminal() {
            return false;
        }
        match (rejection.reason, outcome) {
            (RejectReason::Upstream, FetchOutcome::UpstreamError { status: 503, .. }) => true,
            (RejectReason::Upstream, FetchOutcome::UpstreamError { status, raw_body })
                if (500..600).contains(status) =>
            {
                mentions_overload(&normalize_error_message(raw_body))
            }
            (RejectReason::Upstream, _) => false,
            _ => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use codefetch_core::TransportCause;
    use serde_json::json;

    fn eligible(outcome: &FetchOutcome) -> bool {
        let rejection = classify(outcome).into_result().unwrap_err();
        RetryPolicy::default().should_retry(outcome, &rejection)
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(700));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(2800));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(5600));
    }

    #[test]
    fn test_custom_base_delay() {
        let policy = RetryPolicy::new(5).with_base_delay(Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(160));
        assert_eq!(policy.max_attempts(), 6);
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.initial_state().can_retry());
    }

    #[test]
    fn test_transport_failures_retry() {
        assert!(eligible(&FetchOutcome::transport(TransportCause::Abort)));
        assert!(eligible(&FetchOutcome::transport(TransportCause::Network)));
        assert!(eligible(&FetchOutcome::transport(TransportCause::Other)));
    }

    #[test]
    fn test_503_always_retries() {
        assert!(eligible(&FetchOutcome::upstream(503, "")));
        assert!(eligible(&FetchOutcome::upstream(503, json!({ "detail": "x" }))));
    }

    #[test]
    fn test_5xx_retries_only_on_overload_message() {
        assert!(eligible(&FetchOutcome::upstream(
            500,
            json!({ "error": { "message": "The model is overloaded" } })
        )));
        assert!(eligible(&FetchOutcome::upstream(
            502,
            r#"{"error":"{\"message\":\"Service Unavailable\"}"}"#
        )));
        assert!(!eligible(&FetchOutcome::upstream(500, "Internal Server Error")));
        assert!(!eligible(&FetchOutcome::upstream(504, "")));
    }

    #[test]
    fn test_4xx_terminal() {
        assert!(!eligible(&FetchOutcome::upstream(404, "Not Found")));
        assert!(!eligible(&FetchOutcome::upstream(429, "overloaded")));
        assert!(!eligible(&FetchOutcome::upstream(403, "unavailable")));
    }

    #[test]
    fn test_content_rejections_terminal() {
        assert!(!eligible(&FetchOutcome::success("<!DOCTYPE html>", "text/html")));
        assert!(!eligible(&FetchOutcome::success("  ", "text/plain")));
        assert!(!eligible(&FetchOutcome::TooLarge {
            limit: 1,
            observed: 2
        }));
    }

    #[test]
    fn test_terminal_reason_wins_over_outcome() {
        let policy = RetryPolicy::default();
        let timeout = FetchOutcome::transport(TransportCause::Abort);
        assert!(!policy.should_retry(&timeout, &Rejection::cancelled()));
        assert!(!policy.should_retry(&timeout, &Rejection::invalid_url()));
    }
}
