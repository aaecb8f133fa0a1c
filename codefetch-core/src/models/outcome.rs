//! Per-attempt fetch outcomes.
//!
//! A [`FetchOutcome`] is produced exactly once per network attempt and is
//! the only input the classifier looks at.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

// ============================================================================
// Fetch Limits
// ============================================================================

/// Hard bounds applied to a single fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Deadline for the whole request, body included.
    pub timeout: Duration,
    /// Body size ceiling in bytes.
    pub max_bytes: u64,
}

impl FetchLimits {
    /// Creates new fetch limits.
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        Self { timeout, max_bytes }
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(12_000),
            max_bytes: 500_000,
        }
    }
}

// ============================================================================
// Transport Cause
// ============================================================================

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportCause {
    /// The deadline fired before the request completed.
    Abort,
    /// DNS, connect, TLS or connection-reset failure.
    Network,
    /// Anything else the HTTP stack reported.
    Other,
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Abort => "abort",
            Self::Network => "network",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Fetch Outcome
// ============================================================================

/// The raw result of one fetch attempt, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 2xx response whose body fit under the size ceiling.
    Success {
        /// Decoded response body.
        body: String,
        /// Lowercased `Content-Type` header, empty when absent.
        content_type: String,
    },
    /// Non-2xx response.
    UpstreamError {
        /// HTTP status code.
        status: u16,
        /// Parsed JSON when the upstream declared JSON, otherwise the text.
        raw_body: Value,
    },
    /// 2xx response rejected because the body exceeded the ceiling.
    TooLarge {
        /// The configured ceiling.
        limit: u64,
        /// Bytes seen (or declared) when the ceiling was crossed.
        observed: u64,
    },
    /// No HTTP response was obtained.
    TransportError {
        /// What went wrong.
        cause: TransportCause,
    },
}

impl FetchOutcome {
    /// Shorthand for a successful outcome.
    pub fn success(body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::Success {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// Shorthand for an upstream error with a text body.
    pub fn upstream(status: u16, raw_body: impl Into<Value>) -> Self {
        Self::UpstreamError {
            status,
            raw_body: raw_body.into(),
        }
    }

    /// Shorthand for a transport error.
    pub fn transport(cause: TransportCause) -> Self {
        Self::TransportError { cause }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::UpstreamError { .. } => "upstream_error",
            Self::TooLarge { .. } => "too_large",
            Self::TransportError { .. } => "transport_error",
        }
    }
}
