//! Built-in forge rules.

use codefetch_core::ForgeKind;
use url::Url;

use super::{ForgeRule, path_parts, set_query_param};

// ============================================================================
// GitHub
// ============================================================================

/// `github.com/<owner>/<repo>/{blob,raw}/<branch>/<path>` to
/// `raw.githubusercontent.com/<owner>/<repo>/<branch>/<path>`.
///
/// Any other path shape gets `plain=1` appended. That parameter is a
/// best-effort guess: nothing verifies GitHub honors it, and the classifier
/// still rejects the response if an HTML page comes back.
pub struct GitHubRule;

impl GitHubRule {
    fn raw_url(parts: &[&str], marker: &str) -> Option<Url> {
        // Owner and repo precede the marker, so a repo named after the
        // marker is not mistaken for it.
        let idx = parts.iter().skip(2).position(|p| *p == marker)? + 2;
        // A branch plus at least one path segment must follow the marker.
        if parts.len() <= idx + 2 {
            return None;
        }
        let (owner, repo) = (parts[0], parts[1]);
        let branch = parts[idx + 1];
        let file_path = parts[idx + 2..].join("/");
        Url::parse(&format!(
            "https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{file_path}"
        ))
        .ok()
    }
}

impl ForgeRule for GitHubRule {
    fn kind(&self) -> ForgeKind {
        ForgeKind::GitHub
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["github.com", "www.github.com"]
    }

    fn rewrite(&self, url: &Url) -> Option<Url> {
        let parts = path_parts(url);
        if let Some(raw) = Self::raw_url(&parts, "blob").or_else(|| Self::raw_url(&parts, "raw")) {
            return Some(raw);
        }

        let mut fallback = url.clone();
        set_query_param(&mut fallback, "plain", "1");
        Some(fallback)
    }

    fn describe(&self) -> &'static str {
        "blob/raw views -> raw.githubusercontent.com, otherwise ?plain=1"
    }
}

// ============================================================================
// Gist
// ============================================================================

/// `gist.github.com/<user>/<id>[/<file>]` to
/// `gist.githubusercontent.com/<user>/<id>/raw[/<file>]`.
pub struct GistRule;

impl ForgeRule for GistRule {
    fn kind(&self) -> ForgeKind {
        ForgeKind::Gist
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["gist.github.com"]
    }

    fn rewrite(&self, url: &Url) -> Option<Url> {
        let parts = path_parts(url);
        let [user, id, rest @ ..] = parts.as_slice() else {
            return None;
        };

        let mut raw = format!("https://gist.githubusercontent.com/{user}/{id}/raw");
        if !rest.is_empty() {
            raw.push('/');
            raw.push_str(&rest.join("/"));
        }
        Url::parse(&raw).ok()
    }

    fn describe(&self) -> &'static str {
        "gist pages -> gist.githubusercontent.com/.../raw"
    }
}

// ============================================================================
// Raw Hosts
// ============================================================================

/// Hosts that already serve raw content. URLs pass through unchanged.
pub struct RawHostRule;

impl ForgeRule for RawHostRule {
    fn kind(&self) -> ForgeKind {
        ForgeKind::GitHubRaw
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["raw.githubusercontent.com", "gist.githubusercontent.com"]
    }

    fn rewrite(&self, _url: &Url) -> Option<Url> {
        None
    }

    fn describe(&self) -> &'static str {
        "already raw, unchanged"
    }
}

// ============================================================================
// GitLab
// ============================================================================

/// Replaces the first `blob` path segment with `raw`, keeping everything
/// else (other segments, query, fragment) as is.
pub struct GitLabRule;

impl ForgeRule for GitLabRule {
    fn kind(&self) -> ForgeKind {
        ForgeKind::GitLab
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["gitlab.com", "www.gitlab.com"]
    }

    fn rewrite(&self, url: &Url) -> Option<Url> {
        let mut parts = path_parts(url);
        let idx = parts.iter().position(|p| *p == "blob")?;
        parts[idx] = "raw";
        let path = format!("/{}", parts.join("/"));

        let mut raw = url.clone();
        raw.set_path(&path);
        Some(raw)
    }

    fn describe(&self) -> &'static str {
        "/blob/ -> /raw/"
    }
}

// ============================================================================
// Bitbucket
// ============================================================================

/// Keeps the path and sets `raw=1`.
pub struct BitbucketRule;

impl ForgeRule for BitbucketRule {
    fn kind(&self) -> ForgeKind {
        ForgeKind::Bitbucket
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["bitbucket.org", "www.bitbucket.org"]
    }

    fn rewrite(&self, url: &Url) -> Option<Url> {
        let mut raw = url.clone();
        set_query_param(&mut raw, "raw", "1");
        Some(raw)
    }

    fn describe(&self) -> &'static str {
        "?raw=1"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::forge::normalize;
    use codefetch_core::ForgeKind;

    fn resolve(input: &str) -> String {
        normalize(input).unwrap().as_str().to_string()
    }

    #[test]
    fn test_github_blob() {
        let cases = [
            (
                "https://github.com/rust-lang/rust/blob/master/src/main.rs",
                "https://raw.githubusercontent.com/rust-lang/rust/master/src/main.rs",
            ),
            (
                "https://github.com/o/r/blob/v1.2.0/a/b/c/deep.py?plain=0#L10",
                "https://raw.githubusercontent.com/o/r/v1.2.0/a/b/c/deep.py",
            ),
            (
                "http://github.com/o/r/blob/main/x.sol",
                "https://raw.githubusercontent.com/o/r/main/x.sol",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(resolve(input), expected, "Failed for {input}");
        }
    }

    #[test]
    fn test_github_repo_named_like_marker() {
        let cases = [
            (
                "https://github.com/o/blob/blob/main/x.rs",
                "https://raw.githubusercontent.com/o/blob/main/x.rs",
            ),
            (
                "https://github.com/raw/raw/raw/dev/src/raw.c",
                "https://raw.githubusercontent.com/raw/raw/dev/src/raw.c",
            ),
            (
                "https://github.com/blob/r/blob/main/a.md",
                "https://raw.githubusercontent.com/blob/r/main/a.md",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(resolve(input), expected, "Failed for {input}");
        }
    }

    #[test]
    fn test_github_raw_view() {
        assert_eq!(
            resolve("https://github.com/o/r/raw/main/lib/util.ts"),
            "https://raw.githubusercontent.com/o/r/main/lib/util.ts"
        );
    }

    #[test]
    fn test_github_keeps_percent_encoding() {
        assert_eq!(
            resolve("https://github.com/o/r/blob/main/my%20file.rs"),
            "https://raw.githubusercontent.com/o/r/main/my%20file.rs"
        );
    }

    #[test]
    fn test_github_fallback_plain() {
        let location = normalize("https://github.com/o/r").unwrap();
        assert_eq!(location.as_str(), "https://github.com/o/r?plain=1");
        assert_eq!(location.forge(), ForgeKind::GitHub);
        assert!(location.was_rewritten());

        // blob with no path after the branch
        assert_eq!(
            resolve("https://github.com/o/r/blob/main"),
            "https://github.com/o/r/blob/main?plain=1"
        );

        // existing query is kept, plain is replaced
        assert_eq!(
            resolve("https://github.com/o/r/tree/main?tab=readme&plain=0"),
            "https://github.com/o/r/tree/main?tab=readme&plain=1"
        );
    }

    #[test]
    fn test_gist() {
        assert_eq!(
            resolve("https://gist.github.com/alice/abc123"),
            "https://gist.githubusercontent.com/alice/abc123/raw"
        );
        assert_eq!(
            resolve("https://gist.github.com/alice/abc123/main.go"),
            "https://gist.githubusercontent.com/alice/abc123/raw/main.go"
        );
    }

    #[test]
    fn test_gist_too_short_is_unchanged() {
        let location = normalize("https://gist.github.com/alice").unwrap();
        assert_eq!(location.as_str(), "https://gist.github.com/alice");
        assert_eq!(location.forge(), ForgeKind::Gist);
        assert!(!location.was_rewritten());
    }

    #[test]
    fn test_raw_round_trip() {
        let inputs = [
            "https://raw.githubusercontent.com/o/r/main/src/lib.rs",
            "https://raw.githubusercontent.com/o/r/refs/heads/main/a.py?token=abc",
            "https://gist.githubusercontent.com/alice/abc123/raw/main.go",
        ];

        for input in inputs {
            let location = normalize(input).unwrap();
            assert_eq!(location.as_str(), input);
            assert_eq!(location.forge(), ForgeKind::GitHubRaw);
            assert!(!location.was_rewritten());
        }
    }

    #[test]
    fn test_gitlab_blob_in_place() {
        let cases = [
            (
                "https://gitlab.com/group/project/-/blob/main/src/app.rb",
                "https://gitlab.com/group/project/-/raw/main/src/app.rb",
            ),
            (
                "https://gitlab.com/group/sub/project/-/blob/feature%2Fx/README.md?ref_type=heads",
                "https://gitlab.com/group/sub/project/-/raw/feature%2Fx/README.md?ref_type=heads",
            ),
            (
                "https://gitlab.com/g/p/blob/main/blob/x.c",
                "https://gitlab.com/g/p/raw/main/blob/x.c",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(resolve(input), expected, "Failed for {input}");
        }
    }

    #[test]
    fn test_gitlab_without_blob_is_unchanged() {
        let location = normalize("https://gitlab.com/group/project/-/raw/main/a.rs").unwrap();
        assert_eq!(location.as_str(), "https://gitlab.com/group/project/-/raw/main/a.rs");
        assert!(!location.was_rewritten());
    }

    #[test]
    fn test_bitbucket_sets_raw() {
        assert_eq!(
            resolve("https://bitbucket.org/team/repo/src/main/app.py"),
            "https://bitbucket.org/team/repo/src/main/app.py?raw=1"
        );
        assert_eq!(
            resolve("https://bitbucket.org/team/repo/src/main/app.py?at=dev&raw=0"),
            "https://bitbucket.org/team/repo/src/main/app.py?at=dev&raw=1"
        );
    }
}
