//! Fetch error types.
//!
//! These cover setup failures only. Retrieval failures are values
//! ([`codefetch_core::Rejection`]) and never surface as `FetchError`.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for building and configuring the fetch stack.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid header value in the settings.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
