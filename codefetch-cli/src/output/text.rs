//! Text output formatting with colors.

use codefetch_core::{CanonicalLocation, ForgeKind, Rejection, RetrievedSource};
use codefetch_fetch::{AttemptRecord, ForgeRule};
use std::time::Duration;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One-line summary of a retrieved file: name, language, size, origin.
    pub fn format_source_header(&self, source: &RetrievedSource) -> String {
        let language = source.hints.language.as_deref().unwrap_or("unknown");
        let attempts = if source.attempts == 1 {
            "1 attempt".to_string()
        } else {
            format!("{} attempts", source.attempts)
        };

        format!(
            "{} {} {} {}\n{}",
            self.bold(&source.hints.filename),
            self.cyan(&format!("({language})")),
            self.format_bytes(source.byte_len() as u64),
            self.dim(&format!("· {attempts}")),
            self.dim(&format!("  from {}", source.location)),
        )
    }

    /// Formats a failed retrieval.
    pub fn format_rejection(&self, rejection: &Rejection) -> String {
        format!(
            "{} {} {}",
            self.red("✗"),
            rejection.message,
            self.dim(&format!("({}, HTTP {})", rejection.reason, rejection.http_status()))
        )
    }

    /// Formats the resolution of an input URL.
    pub fn format_resolution(&self, input: &str, location: &CanonicalLocation) -> String {
        let status = if location.was_rewritten() {
            self.green("rewritten")
        } else {
            self.yellow("unchanged")
        };

        let mut lines = vec![
            format!("{:<9} {}", "Input:", input),
            format!("{:<9} {}", "Resolved:", self.bold(location.as_str())),
            format!("{:<9} {} ({status})", "Forge:", location.forge()),
        ];
        if location.forge() == ForgeKind::GitHub
            && location.url().query_pairs().any(|(k, v)| k == "plain" && v == "1")
        {
            lines.push(self.dim("          plain=1 is best effort; a rendered page may still come back"));
        }
        lines.join("\n")
    }

    /// Formats per-attempt diagnostics.
    pub fn format_attempts(&self, attempts: &[AttemptRecord]) -> String {
        attempts
            .iter()
            .map(|a| {
                let verdict = match a.reason {
                    None => self.green("ok"),
                    Some(reason) => self.red(reason.as_str()),
                };
                format!(
                    "  #{} {} after {} wait, took {} ({})",
                    a.attempt,
                    verdict,
                    format_duration(a.delay_before),
                    format_duration(a.duration),
                    a.outcome
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Header for the forges listing.
    pub fn format_forges_header(&self) -> String {
        self.bold(&format!("{:<12} {:<44} {}", "Forge", "Hosts", "Rewrite"))
    }

    /// One row of the forges listing.
    pub fn format_forge_line(&self, rule: &dyn ForgeRule) -> String {
        format!(
            "{:<12} {:<44} {}",
            rule.kind().display_name(),
            rule.hosts().join(", "),
            self.dim(rule.describe())
        )
    }

    /// Human-readable byte count.
    pub fn format_bytes(&self, bytes: u64) -> String {
        const KB: u64 = 1_000;
        const MB: u64 = 1_000_000;

        #[allow(clippy::cast_precision_loss)]
        let text = if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        };
        self.dim(&text)
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}
