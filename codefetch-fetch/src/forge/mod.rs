//! URL normalization via a host-keyed table of forge rules.
//!
//! Each forge (GitHub, Gist, GitLab, Bitbucket, raw hosts) is a
//! [`ForgeRule`] that knows which hostnames it owns and how to turn a
//! "human" view URL into a raw-content URL. The [`ForgeRegistry`] maps a
//! URL's host to its rule; hosts without a rule pass through unchanged.
//!
//! Adding a forge means implementing [`ForgeRule`] and registering it.
//! Existing rules are never touched.

mod rules;

pub use rules::{BitbucketRule, GistRule, GitHubRule, GitLabRule, RawHostRule};

use codefetch_core::{CanonicalLocation, CoreError, ForgeKind};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

// ============================================================================
// Forge Rule Trait
// ============================================================================

/// A rewriting rule for one forge.
///
/// ## Implementing a Rule
///
/// ```ignore
/// struct CodebergRule;
///
/// impl ForgeRule for CodebergRule {
///     fn kind(&self) -> ForgeKind {
///         ForgeKind::Other
///     }
///
///     fn hosts(&self) -> &'static [&'static str] {
///         &["codeberg.org"]
///     }
///
///     fn rewrite(&self, url: &Url) -> Option<Url> {
///         // .../src/branch/main/x.rs -> .../raw/branch/main/x.rs
///         None
///     }
///
///     fn describe(&self) -> &'static str {
///         "src/ -> raw/"
///     }
/// }
/// ```
pub trait ForgeRule: Send + Sync {
    /// The forge this rule handles.
    fn kind(&self) -> ForgeKind;

    /// Hostnames (lowercase) this rule owns.
    fn hosts(&self) -> &'static [&'static str];

    /// Rewrites the URL, or returns `None` to keep it unchanged.
    ///
    /// Must not panic for any URL whose host is in [`ForgeRule::hosts`].
    fn rewrite(&self, url: &Url) -> Option<Url>;

    /// One-line description of the rewrite, for listings.
    fn describe(&self) -> &'static str;
}

// ============================================================================
// Forge Registry
// ============================================================================

/// Static storage for the built-in registry.
static BUILTIN: OnceLock<ForgeRegistry> = OnceLock::new();

/// Table of forge rules keyed by hostname.
pub struct ForgeRegistry {
    rules: Vec<Box<dyn ForgeRule>>,
    by_host: HashMap<&'static str, usize>,
}

impl ForgeRegistry {
    /// Creates an empty registry. Every URL passes through unchanged.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_host: HashMap::new(),
        }
    }

    /// Creates a registry with all built-in forge rules.
    pub fn with_builtin_rules() -> Self {
        Self::new()
            .with_rule(Box::new(GitHubRule))
            .with_rule(Box::new(GistRule))
            .with_rule(Box::new(RawHostRule))
            .with_rule(Box::new(GitLabRule))
            .with_rule(Box::new(BitbucketRule))
    }

    /// Returns the shared built-in registry.
    pub fn builtin() -> &'static ForgeRegistry {
        BUILTIN.get_or_init(Self::with_builtin_rules)
    }

    /// Registers a rule. Later rules take over hosts claimed by earlier ones.
    pub fn with_rule(mut self, rule: Box<dyn ForgeRule>) -> Self {
        let index = self.rules.len();
        for host in rule.hosts() {
            self.by_host.insert(*host, index);
        }
        self.rules.push(rule);
        self
    }

    /// Looks up the rule owning a host.
    pub fn rule_for_host(&self, host: &str) -> Option<&dyn ForgeRule> {
        let index = *self.by_host.get(host)?;
        self.rules.get(index).map(|rule| rule.as_ref())
    }

    /// Returns all registered rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn ForgeRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Resolves user input to a canonical raw-content location.
    ///
    /// Fails only when the input is not an absolute `http(s)` URL.
    pub fn normalize(&self, input: &str) -> Result<CanonicalLocation, CoreError> {
        let url = Url::parse(input.trim()).map_err(|e| CoreError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CoreError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url.host_str().unwrap_or_default().to_string();
        let Some(rule) = self.rule_for_host(&host) else {
            debug!(host = %host, "No forge rule, passing URL through");
            return CanonicalLocation::new(url, ForgeKind::Other, false);
        };

        match rule.rewrite(&url) {
            Some(rewritten) => {
                debug!(forge = %rule.kind(), from = %url, to = %rewritten, "Rewrote URL");
                CanonicalLocation::new(rewritten, rule.kind(), true)
            }
            None => CanonicalLocation::new(url, rule.kind(), false),
        }
    }
}

impl Default for ForgeRegistry {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

/// Resolves input with the built-in forge rules.
pub fn normalize(input: &str) -> Result<CanonicalLocation, CoreError> {
    ForgeRegistry::builtin().normalize(input)
}

// ============================================================================
// Helpers
// ============================================================================

/// Non-empty path segments of a URL, still percent-encoded.
pub(crate) fn path_parts(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Sets a query parameter the way `URLSearchParams.set` does.
///
/// The first existing pair with `key` is replaced in place, later duplicates
/// are dropped, and the pair is appended when absent.
pub(crate) fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != key {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_string()))
        })
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    query.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !replaced {
        query.append_pair(key, value);
    }
}

// ============================================================================
// Tests
// ============================================================================
