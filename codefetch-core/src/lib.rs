// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `codefetch` Core
//!
//! Core types and models for the `codefetch` retrieval pipeline.
//!
//! This crate provides the foundational types shared by the fetch crate
//! and the CLI:
//!
//! - Domain models (source references, canonical locations, outcomes)
//! - The classified result and rejection taxonomy
//! - The `{ code }` / `{ error }` response envelope
//! - Error types
//!
//! ## Key Types
//!
//! ### Inputs
//! - [`SourceReference`] - Raw user input, URL or literal code
//! - [`CanonicalLocation`] - Validated `http(s)` URL after forge rewriting
//! - [`ForgeKind`] - Which forge rule matched
//!
//! ### Attempts
//! - [`FetchOutcome`] - What one network attempt produced
//! - [`FetchLimits`] - Timeout and size ceiling for an attempt
//! - [`RetryState`] - Attempt counter and backoff unit
//!
//! ### Results
//! - [`ClassifiedResult`] - Code or a [`Rejection`]
//! - [`RejectReason`] - Failure classes and their HTTP statuses
//! - [`CodeEnvelope`] - Wire envelope for callers
//! - [`RetrievedSource`] - Fetched code with hints and provenance

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Inputs
    CanonicalLocation,
    ForgeKind,
    SourceInput,
    SourceReference,
    // Attempts
    FetchLimits,
    FetchOutcome,
    RetryState,
    TransportCause,
    // Results
    ClassifiedResult,
    CodeEnvelope,
    OVERLOADED_MESSAGE,
    RejectReason,
    Rejection,
    RetrievedSource,
    // Hints
    SourceHints,
    language_for_extension,
};
