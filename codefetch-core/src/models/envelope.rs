//! The `{ code }` / `{ error }` response envelope.

use serde::Serialize;

use super::result::Rejection;

/// Response returned across the retrieval boundary.
///
/// Serializes to exactly `{"code": "..."}` or `{"error": "..."}`. The HTTP
/// status is carried alongside but never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CodeEnvelope {
    /// Successful retrieval.
    Code {
        /// The fetched (or literal) source code.
        code: String,
    },
    /// Failed retrieval.
    Error {
        /// User-facing error message.
        error: String,
        /// HTTP status for this error.
        #[serde(skip)]
        status: u16,
    },
}

impl CodeEnvelope {
    /// Creates a success envelope.
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code { code: code.into() }
    }

    /// HTTP status for this envelope.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Code { .. } => 200,
            Self::Error { status, .. } => *status,
        }
    }

    /// Returns true for a success envelope.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code { .. })
    }
}

impl From<Rejection> for CodeEnvelope {
    fn from(rejection: Rejection) -> Self {
        Self::Error {
            status: rejection.http_status(),
            error: rejection.message,
        }
    }
}

impl From<Result<String, Rejection>> for CodeEnvelope {
    fn from(result: Result<String, Rejection>) -> Self {
        match result {
            Ok(code) => Self::code(code),
            Err(rejection) => rejection.into(),
        }
    }
}
