// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # `codefetch` Fetch
//!
//! The remote code retrieval pipeline.
//!
//! Leaf-first, the pieces are:
//!
//! - [`forge`] - URL normalizer, a host-keyed table of rewrite rules
//! - [`host::http`] - Bounded HTTP fetcher (deadline, size ceiling)
//! - [`classify`] - Response classifier
//! - [`error_message`] - Error payload normalizer
//! - [`pipeline`] - Retry orchestrator and the `{ code }` / `{ error }` boundary
//!
//! ## Example
//!
//! ```ignore
//! use codefetch_fetch::{CancelToken, RetrievalSettings, Retriever};
//!
//! let retriever = Retriever::new(RetrievalSettings::default())?;
//! let envelope = retriever
//!     .retrieve_code("https://github.com/o/r/blob/main/src/lib.rs", &CancelToken::new())
//!     .await;
//! println!("{}", serde_json::to_string(&envelope)?);
//! ```

pub mod cancel;
pub mod classify;
pub mod error;
pub mod error_message;
pub mod fetcher;
pub mod forge;
pub mod host;
pub mod pipeline;
pub mod retry;
pub mod settings;

// Errors
pub use error::FetchError;

// Normalizer
pub use forge::{ForgeRegistry, ForgeRule, normalize};

// Fetcher
pub use fetcher::SourceFetcher;
pub use host::{DEFAULT_USER_AGENT, HttpFetcher};

// Classifier & error normalizer
pub use classify::{HTML_MESSAGE, classify, looks_like_html};
pub use error_message::{mentions_overload, normalize_error_message, normalize_error_text};

// Orchestrator
pub use cancel::CancelToken;
pub use pipeline::{
    AttemptRecord, FetchedBody, RetrievalReport, Retriever, SourceRetrieval, fetch_with_retry,
};
pub use retry::RetryPolicy;
pub use settings::RetrievalSettings;
