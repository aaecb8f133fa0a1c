//! Retry bookkeeping for a single retrieval.

use std::time::Duration;

/// Ephemeral retry counter scoped to one retrieval call.
///
/// `attempt` is 1-based and never exceeds `max_attempts`
/// (`max_retries + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// The attempt currently running (1-based).
    pub attempt: u32,
    /// Total attempts allowed.
    pub max_attempts: u32,
    /// Backoff unit.
    pub base_delay: Duration,
}

impl RetryState {
    /// Creates the state for the first attempt.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_retries.saturating_add(1),
            base_delay,
        }
    }

    /// Whether another attempt is allowed after the current one.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Retries already consumed.
    pub fn retries_used(&self) -> u32 {
        self.attempt - 1
    }

    /// Backoff before retry `n` (1-based): `base_delay * 2^(n-1)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Moves to the next attempt and returns the delay to wait first.
    ///
    /// Returns `None` when the budget is exhausted; the state is unchanged
    /// in that case.
    pub fn advance(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }
        let delay = self.delay_for_retry(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}
