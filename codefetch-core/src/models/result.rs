//! Classified retrieval results.
//!
//! This module contains the terminal values of a retrieval:
//! - [`ClassifiedResult`] - Code or a rejection
//! - [`Rejection`] - Why a retrieval failed, with a user-facing message
//! - [`RejectReason`] - The failure class

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown once retries on a transient failure are used up.
pub const OVERLOADED_MESSAGE: &str = "Service temporarily overloaded. Please try again later.";

// ============================================================================
// Reject Reason
// ============================================================================

/// Failure classes a retrieval can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// An HTML page was served instead of a raw file.
    Html,
    /// The file was empty or whitespace only.
    Empty,
    /// The body exceeded the size ceiling.
    TooLarge,
    /// The upstream answered with a non-2xx status.
    Upstream,
    /// The input was not a usable URL.
    InvalidUrl,
    /// The request deadline fired.
    Timeout,
    /// Network or otherwise unclassified transport failure.
    Unknown,
    /// The surrounding request was cancelled.
    Cancelled,
}

impl RejectReason {
    /// Returns the wire name of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Empty => "empty",
            Self::TooLarge => "too-large",
            Self::Upstream => "upstream",
            Self::InvalidUrl => "invalid-url",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
            Self::Cancelled => "cancelled",
        }
    }

    /// HTTP status used in the response envelope for this reason.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidUrl => 400,
            Self::TooLarge => 413,
            Self::Html => 415,
            Self::Empty => 422,
            Self::Upstream => 502,
            Self::Timeout | Self::Unknown | Self::Cancelled => 500,
        }
    }

    /// Whether this class is a request-shape problem that retrying cannot fix.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Html | Self::Empty | Self::TooLarge | Self::InvalidUrl | Self::Cancelled
        )
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rejection
// ============================================================================

/// A failed retrieval with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Failure class.
    pub reason: RejectReason,
    /// Message safe to show to an end user.
    pub message: String,
    /// Upstream HTTP status, for `upstream` rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Rejection {
    /// Creates a rejection without an upstream status.
    pub fn new(reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            status: None,
        }
    }

    /// Creates an upstream rejection for the given status.
    pub fn upstream(status: u16) -> Self {
        Self {
            reason: RejectReason::Upstream,
            message: format!("Upstream error ({status}) fetching file"),
            status: Some(status),
        }
    }

    /// Rejection for input that is not a usable URL.
    pub fn invalid_url() -> Self {
        Self::new(RejectReason::InvalidUrl, "Invalid URL")
    }

    /// Rejection for a missing or blank URL.
    pub fn missing_url() -> Self {
        Self::new(RejectReason::InvalidUrl, "Missing url")
    }

    /// Rejection for a retrieval abandoned by its caller.
    pub fn cancelled() -> Self {
        Self::new(RejectReason::Cancelled, "Request cancelled")
    }

    /// Replaces the message with the generic overload message.
    pub fn into_overloaded(mut self) -> Self {
        self.message = OVERLOADED_MESSAGE.to_string();
        self
    }

    /// HTTP status used in the response envelope.
    pub fn http_status(&self) -> u16 {
        self.reason.http_status()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rejection {}

// ============================================================================
// Classified Result
// ============================================================================

/// The classification of one fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResult {
    /// Usable source text. Never empty, never an HTML document.
    Ok {
        /// The fetched source code.
        code: String,
    },
    /// The outcome was rejected.
    Rejected(Rejection),
}

impl ClassifiedResult {
    /// Returns true for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Ok { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<String, Rejection> {
        match self {
            Self::Ok { code } => Ok(code),
            Self::Rejected(rejection) => Err(rejection),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
