// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! codefetch CLI - retrieve remote source files from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Fetch a file from a GitHub blob page
//! codefetch https://github.com/rust-lang/rust/blob/master/README.md
//!
//! # Envelope as JSON, with provenance and attempts
//! codefetch fetch https://gist.github.com/u/abc123 --format json --details --pretty
//!
//! # Show how a URL is rewritten without fetching it
//! codefetch resolve https://gitlab.com/g/p/-/blob/main/app.rb
//!
//! # Serve the fetch-code endpoint
//! codefetch serve --port 3000
//! ```

mod commands;
mod config;
mod output;
mod server;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use codefetch_fetch::RetrievalSettings;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{fetch, forges, resolve, serve};

// ============================================================================
// CLI Definition
// ============================================================================

/// codefetch CLI - remote code retrieval.
#[derive(Parser)]
#[command(name = "codefetch")]
#[command(about = "Fetch source files from code-hosting URLs")]
#[command(long_about = r#"
codefetch turns a code-hosting URL into the raw contents of the file.

Supported forges:
  • GitHub blob pages (github.com)
  • GitHub Gists (gist.github.com)
  • GitHub raw (raw.githubusercontent.com)
  • GitLab (gitlab.com)
  • Bitbucket (bitbucket.org)
  • Any other http(s) URL, fetched as-is

Input that is not a URL is treated as literal code and echoed back.

Examples:
  codefetch <url>                          # Fetch and print the file
  codefetch <url> --format json            # { "code": ... } envelope
  codefetch resolve <url>                  # Show the rewritten URL
  codefetch serve                          # HTTP endpoint on :3000
"#)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run. If none, fetches INPUT.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// URL or literal code to fetch when no subcommand is given.
    pub input: Option<String>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info and attempts).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum accepted body size in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_bytes: Option<u64>,

    /// Retries after the first attempt.
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Backoff unit in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub base_delay_ms: Option<u64>,
}

impl Cli {
    /// Path of the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(config::default_config_path)
    }

    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            timeout_ms: self.timeout_ms,
            max_bytes: self.max_bytes,
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
        }
    }

    /// Effective settings: config file, then command-line overrides.
    pub fn settings(&self) -> Result<RetrievalSettings> {
        config::resolve(Some(&self.config_path()), &self.overrides())
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a file (default if a URL is given without a command).
    #[command(visible_alias = "f")]
    Fetch(fetch::FetchArgs),

    /// Show the canonical URL for an input without fetching.
    #[command(visible_alias = "r")]
    Resolve(resolve::ResolveArgs),

    /// List the forge rewrite rules.
    Forges,

    /// Serve the fetch-code HTTP endpoint.
    #[command(visible_alias = "s")]
    Serve(serve::ServeArgs),

    /// Manage configuration.
    Config(commands::config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error, including a rejected fetch.
    Error = 1,
    /// Cancelled by Ctrl-C.
    Interrupted = 130,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("codefetch=debug,info")
    } else {
        EnvFilter::new("codefetch=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Fetch(args)) => fetch::run(args, &cli).await,
        Some(Commands::Resolve(args)) => resolve::run(args, &cli),
        Some(Commands::Forges) => forges::run(&cli),
        Some(Commands::Serve(args)) => serve::run(args, &cli).await,
        Some(Commands::Config(args)) => commands::config::run(args, &cli),
        None => match &cli.input {
            Some(input) => {
                let args = fetch::FetchArgs {
                    input: input.clone(),
                    details: false,
                };
                fetch::run(&args, &cli).await
            }
            None => Cli::command().print_help().map_err(Into::into),
        },
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
