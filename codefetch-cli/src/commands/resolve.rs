//! Resolve command - show where a URL will be fetched from.

use anyhow::{Context, Result};
use clap::Args;
use codefetch_fetch::ForgeRegistry;
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// URL to normalize.
    pub url: String,
}

/// Runs the resolve command. No network access.
pub fn run(args: &ResolveArgs, cli: &Cli) -> Result<()> {
    let location = ForgeRegistry::builtin()
        .normalize(&args.url)
        .with_context(|| format!("Invalid URL: {}", args.url))?;
    debug!(url = %location, forge = %location.forge(), "Resolved");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_resolution(&args.url, &location));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_resolution(&args.url, &location)?);
        }
    }

    Ok(())
}
