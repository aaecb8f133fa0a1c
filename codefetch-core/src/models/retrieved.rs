//! A successfully retrieved source file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::hints::SourceHints;
use super::source::CanonicalLocation;

/// Source code fetched from a remote location, with its provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedSource {
    /// The fetched code. Never empty.
    pub code: String,
    /// Where it was fetched from.
    pub location: CanonicalLocation,
    /// Lowercased content type reported by the upstream.
    pub content_type: String,
    /// File name and language guesses.
    pub hints: SourceHints,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

impl RetrievedSource {
    /// Creates a retrieved source.
    ///
    /// Hints come from `requested`, the URL as the caller gave it, since a
    /// forge rewrite can replace the meaningful last segment (a gist id
    /// becomes `raw`).
    pub fn new(
        code: String,
        requested: &Url,
        location: CanonicalLocation,
        content_type: String,
        attempts: u32,
    ) -> Self {
        let hints = SourceHints::from_url(requested).refine_with_content_type(&content_type);
        Self {
            code,
            location,
            content_type,
            hints,
            attempts,
            fetched_at: Utc::now(),
        }
    }

    /// Size of the code in bytes.
    pub fn byte_len(&self) -> usize {
        self.code.len()
    }
}
