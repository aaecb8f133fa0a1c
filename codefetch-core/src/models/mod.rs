//! Domain models for codefetch.
//!
//! Every type here is request-scoped: created for one retrieval and
//! dropped when it resolves. Nothing is persisted.
//!
//! ## Submodules
//!
//! - [`source`] - Inputs (SourceReference, CanonicalLocation, ForgeKind)
//! - [`outcome`] - Per-attempt fetch outcomes (FetchOutcome, FetchLimits)
//! - [`result`] - Terminal values (ClassifiedResult, Rejection)
//! - [`retry`] - Retry bookkeeping (RetryState)
//! - [`envelope`] - The `{ code }` / `{ error }` wire envelope
//! - [`hints`] - File name and language guesses
//! - [`retrieved`] - A successfully fetched file with provenance

pub mod envelope;
pub mod hints;
pub mod outcome;
pub mod result;
pub mod retrieved;
pub mod retry;
pub mod source;

// Re-export everything at the models level
pub use envelope::CodeEnvelope;
pub use hints::{SourceHints, language_for_extension};
pub use outcome::{FetchLimits, FetchOutcome, TransportCause};
pub use result::{ClassifiedResult, OVERLOADED_MESSAGE, RejectReason, Rejection};
pub use retrieved::RetrievedSource;
pub use retry::RetryState;
pub use source::{CanonicalLocation, ForgeKind, SourceInput, SourceReference};
