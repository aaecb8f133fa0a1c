//! Configuration file handling.
//!
//! The config file is the JSON form of [`RetrievalSettings`]. A missing
//! file means defaults; command-line flags override whatever it holds.

use anyhow::{Context, Result};
use codefetch_fetch::RetrievalSettings;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/codefetch`
/// - macOS: `~/Library/Application Support/codefetch`
/// - Windows: `%APPDATA%\codefetch`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("codefetch"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Loads settings from `path`, falling back to defaults when it is absent.
pub fn load_from(path: &Path) -> Result<RetrievalSettings> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(RetrievalSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: RetrievalSettings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    debug!(path = %path.display(), "Loaded configuration");
    Ok(settings)
}

/// Writes settings to `path` as pretty JSON, creating parent directories.
pub fn save_to(settings: &RetrievalSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Saved configuration");
    Ok(())
}

/// Per-field overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--timeout-ms`
    pub timeout_ms: Option<u64>,
    /// `--max-bytes`
    pub max_bytes: Option<u64>,
    /// `--max-retries`
    pub max_retries: Option<u32>,
    /// `--base-delay-ms`
    pub base_delay_ms: Option<u64>,
}

impl Overrides {
    /// Applies the overrides that are set.
    pub fn apply(&self, mut settings: RetrievalSettings) -> RetrievalSettings {
        if let Some(v) = self.timeout_ms {
            settings.timeout_ms = v;
        }
        if let Some(v) = self.max_bytes {
            settings.max_bytes = v;
        }
        if let Some(v) = self.max_retries {
            settings.max_retries = v;
        }
        if let Some(v) = self.base_delay_ms {
            settings.base_delay_ms = v;
        }
        settings
    }
}

/// Loads the config file (explicit path or default) and applies overrides.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<RetrievalSettings> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    let settings = overrides.apply(load_from(&path)?);
    settings
        .validate()
        .with_context(|| format!("Invalid settings (config: {})", path.display()))?;
    Ok(settings)
}

// ============================================================================
// Tests
// ============================================================================
