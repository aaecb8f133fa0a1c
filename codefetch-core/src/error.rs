//! Core error types for `codefetch`.

use thiserror::Error;

/// Core error type for `codefetch` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parsed but uses a scheme other than `http` or `https`.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}
