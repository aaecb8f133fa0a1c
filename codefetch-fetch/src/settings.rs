//! Retrieval settings.
//!
//! Settings are passed explicitly to a [`crate::Retriever`]; nothing in the
//! pipeline reads global state.

use codefetch_core::FetchLimits;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::FetchError;
use crate::host::DEFAULT_USER_AGENT;
use crate::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy};

/// Default per-attempt deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;

/// Default body ceiling in bytes.
pub const DEFAULT_MAX_BYTES: u64 = 500_000;

/// Retries above this are refused; the backoff would run for hours.
pub const MAX_RETRIES_CEILING: u32 = 10;

// ============================================================================
// Retrieval Settings
// ============================================================================

/// Tunables for one retrieval pipeline.
///
/// Serialized with camelCase keys; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// Deadline for one attempt, body included.
    pub timeout_ms: u64,
    /// Body ceiling in bytes.
    pub max_bytes: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each later one.
    pub base_delay_ms: u64,
    /// `User-Agent` sent upstream.
    pub user_agent: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_bytes: DEFAULT_MAX_BYTES,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: u64::try_from(DEFAULT_BASE_DELAY.as_millis()).unwrap_or(700),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RetrievalSettings {
    /// Sets the per-attempt deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the body ceiling.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff unit.
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The per-attempt deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The backoff unit.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Limits handed to the fetcher on every attempt.
    pub fn limits(&self) -> FetchLimits {
        FetchLimits::new(self.timeout(), self.max_bytes)
    }

    /// Retry policy for the orchestrator.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_base_delay(self.base_delay())
    }

    /// Checks that the settings can drive a retrieval.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.timeout_ms == 0 {
            return Err(FetchError::InvalidSettings(
                "timeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(FetchError::InvalidSettings(
                "maxBytes must be greater than zero".to_string(),
            ));
        }
        if self.max_retries > MAX_RETRIES_CEILING {
            return Err(FetchError::InvalidSettings(format!(
                "maxRetries must be at most {MAX_RETRIES_CEILING}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(FetchError::InvalidSettings(
                "userAgent must not be empty".to_string(),
            ));
        }
        HeaderValue::from_str(&self.user_agent)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
