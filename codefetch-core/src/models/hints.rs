//! File name and language hints derived from a URL.

use serde::{Deserialize, Serialize};
use url::Url;

/// Extension to language tag table used by code viewers.
const EXT_TO_LANG: &[(&str, &str)] = &[
    ("txt", "txt"),
    ("md", "md"),
    ("json", "json"),
    ("js", "js"),
    ("jsx", "jsx"),
    ("ts", "ts"),
    ("tsx", "tsx"),
    ("py", "py"),
    ("sh", "sh"),
    ("bash", "sh"),
    ("zsh", "sh"),
    ("sol", "sol"),
    ("rs", "rs"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kt"),
    ("swift", "swift"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cs", "cs"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
];

/// Best-effort display hints for a fetched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHints {
    /// Last path segment, or `source` when there is none.
    pub filename: String,
    /// Language tag, when one could be guessed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SourceHints {
    /// Guesses hints from the URL path.
    pub fn from_url(url: &Url) -> Self {
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("source")
            .to_string();

        let language = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| language_for_extension(&ext).unwrap_or(ext.as_str()).to_string());

        Self { filename, language }
    }

    /// Fills in a missing language from the response content type.
    pub fn refine_with_content_type(mut self, content_type: &str) -> Self {
        if self.language.is_some() {
            return self;
        }
        let ct = content_type.to_lowercase();
        // Later matches win.
        for (needle, lang) in [
            ("json", "json"),
            ("markdown", "md"),
            ("javascript", "js"),
            ("python", "py"),
        ] {
            if ct.contains(needle) {
                self.language = Some(lang.to_string());
            }
        }
        self
    }
}

/// Looks up the language tag for a lowercase file extension.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    EXT_TO_LANG
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}
