//! Source reference and canonical location types.
//!
//! This module contains the input side of a retrieval:
//! - [`SourceReference`] - The raw string a user supplied
//! - [`SourceInput`] - Whether that string is a URL or literal code
//! - [`CanonicalLocation`] - A validated, resolved `http(s)` URL
//! - [`ForgeKind`] - Which forge rule produced a location

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use url::Url;

use crate::error::CoreError;

// ============================================================================
// Source Reference
// ============================================================================

/// A user-supplied string that is either a URL or literal source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// The raw input exactly as the caller supplied it.
    pub raw_input: String,
}

/// What a [`SourceReference`] turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// An absolute `http`/`https` URL.
    Url(Url),
    /// Anything else; callers treat it as code.
    Literal(String),
}

impl SourceReference {
    /// Creates a new source reference.
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
        }
    }

    /// Returns true if the trimmed input is empty.
    pub fn is_blank(&self) -> bool {
        self.raw_input.trim().is_empty()
    }

    /// Decides whether this reference points at a remote file.
    ///
    /// Only absolute URLs with an `http` or `https` scheme count as remote.
    /// Everything else, including `ftp://` links and relative paths, is
    /// returned untouched as literal text.
    pub fn resolve_input(&self) -> SourceInput {
        let trimmed = self.raw_input.trim();
        match Url::parse(trimmed) {
            Ok(url) if is_web_scheme(url.scheme()) => SourceInput::Url(url),
            _ => SourceInput::Literal(self.raw_input.clone()),
        }
    }
}

impl From<&str> for SourceReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

// ============================================================================
// Forge Kind
// ============================================================================

/// The forge rule that matched a URL during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgeKind {
    /// github.com blob/raw views
    GitHub,
    /// gist.github.com pages
    Gist,
    /// raw.githubusercontent.com and gist.githubusercontent.com
    GitHubRaw,
    /// gitlab.com
    GitLab,
    /// bitbucket.org
    Bitbucket,
    /// Any host without a dedicated rule.
    Other,
}

impl ForgeKind {
    /// Returns the display name for this forge.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::Gist => "GitHub Gist",
            Self::GitHubRaw => "GitHub Raw",
            Self::GitLab => "GitLab",
            Self::Bitbucket => "Bitbucket",
            Self::Other => "Other",
        }
    }

    /// Returns all forge kinds with a dedicated rule.
    pub fn known() -> &'static [ForgeKind] {
        &[
            Self::GitHub,
            Self::Gist,
            Self::GitHubRaw,
            Self::GitLab,
            Self::Bitbucket,
        ]
    }
}

impl fmt::Display for ForgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Canonical Location
// ============================================================================

/// A resolved URL that is safe to hand to the fetcher.
///
/// The scheme is always `http` or `https`; [`CanonicalLocation::new`] is the
/// only constructor and rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalLocation {
    #[serde(serialize_with = "serialize_url")]
    url: Url,
    forge: ForgeKind,
    rewritten: bool,
}

impl CanonicalLocation {
    /// Creates a location from an already-parsed URL.
    pub fn new(url: Url, forge: ForgeKind, rewritten: bool) -> Result<Self, CoreError> {
        if !is_web_scheme(url.scheme()) {
            return Err(CoreError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(CoreError::InvalidUrl(format!("missing host in {url}")));
        }
        Ok(Self {
            url,
            forge,
            rewritten,
        })
    }

    /// Parses a string into a location without applying any forge rule.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let url = Url::parse(input.trim()).map_err(|e| CoreError::InvalidUrl(e.to_string()))?;
        Self::new(url, ForgeKind::Other, false)
    }

    /// The resolved URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The resolved URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The forge rule that produced this location.
    pub fn forge(&self) -> ForgeKind {
        self.forge
    }

    /// Whether a forge rule changed the URL.
    pub fn was_rewritten(&self) -> bool {
        self.rewritten
    }
}

impl fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

fn serialize_url<S: Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

// ============================================================================
// Tests
// ============================================================================
