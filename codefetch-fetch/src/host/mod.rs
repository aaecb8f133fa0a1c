//! Host APIs for codefetch.
//!
//! - [`http`] - Bounded HTTP fetcher

pub mod http;

pub use http::{DEFAULT_USER_AGENT, HttpFetcher};
