//! JSON output formatting.

use anyhow::Result;
use codefetch_core::{CanonicalLocation, CodeEnvelope, ForgeKind, RetrievedSource};
use codefetch_fetch::{AttemptRecord, ForgeRule};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Envelope plus provenance, for `fetch --details`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutput<'a> {
    #[serde(flatten)]
    pub envelope: &'a CodeEnvelope,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceOutput<'a>>,
    pub attempts: Vec<AttemptOutput>,
}

/// Provenance of a retrieved file. The code itself lives in the envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutput<'a> {
    pub url: &'a str,
    pub forge: ForgeKind,
    pub filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
    pub content_type: &'a str,
    pub bytes: usize,
    pub fetched_at: String,
}

impl<'a> From<&'a RetrievedSource> for SourceOutput<'a> {
    fn from(source: &'a RetrievedSource) -> Self {
        Self {
            url: source.location.as_str(),
            forge: source.location.forge(),
            filename: &source.hints.filename,
            language: source.hints.language.as_deref(),
            content_type: &source.content_type,
            bytes: source.byte_len(),
            fetched_at: source.fetched_at.to_rfc3339(),
        }
    }
}

/// One fetch attempt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutput {
    pub attempt: u32,
    pub delay_ms: u128,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub duration_ms: u128,
}

impl From<&AttemptRecord> for AttemptOutput {
    fn from(record: &AttemptRecord) -> Self {
        Self {
            attempt: record.attempt,
            delay_ms: record.delay_before.as_millis(),
            outcome: record.outcome,
            reason: record.reason.map(|r| r.as_str()),
            duration_ms: record.duration.as_millis(),
        }
    }
}

/// Result of `resolve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput<'a> {
    pub input: &'a str,
    pub url: &'a str,
    pub forge: ForgeKind,
    pub rewritten: bool,
}

/// One forge rule.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeOutput {
    pub forge: ForgeKind,
    pub display_name: &'static str,
    pub hosts: &'static [&'static str],
    pub rewrite: &'static str,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the bare `{ code }` / `{ error }` envelope.
    pub fn format_envelope(&self, envelope: &CodeEnvelope) -> Result<String> {
        self.format(envelope)
    }

    /// Formats the envelope with provenance and attempt diagnostics.
    pub fn format_details(
        &self,
        envelope: &CodeEnvelope,
        source: Option<&RetrievedSource>,
        attempts: &[AttemptRecord],
    ) -> Result<String> {
        self.format(&FetchOutput {
            envelope,
            status: envelope.http_status(),
            source: source.map(SourceOutput::from),
            attempts: attempts.iter().map(AttemptOutput::from).collect(),
        })
    }

    /// Formats a resolved location.
    pub fn format_resolution(&self, input: &str, location: &CanonicalLocation) -> Result<String> {
        self.format(&ResolveOutput {
            input,
            url: location.as_str(),
            forge: location.forge(),
            rewritten: location.was_rewritten(),
        })
    }

    /// Formats the forge rule listing.
    pub fn format_forges<'a>(&self, rules: impl Iterator<Item = &'a dyn ForgeRule>) -> Result<String> {
        let outputs: Vec<ForgeOutput> = rules
            .map(|rule| ForgeOutput {
                forge: rule.kind(),
                display_name: rule.kind().display_name(),
                hosts: rule.hosts(),
                rewrite: rule.describe(),
            })
            .collect();
        self.format(&outputs)
    }
}
