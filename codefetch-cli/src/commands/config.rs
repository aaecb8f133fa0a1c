//! Config command - manage configuration.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use codefetch_fetch::RetrievalSettings;
use tracing::info;

use crate::config;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective settings (file plus command-line overrides).
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a config file with default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(*force, cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;

    match cli.format {
        OutputFormat::Text => {
            println!("codefetch Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file:  {}", cli.config_path().display());
            println!("Timeout:      {} ms", settings.timeout_ms);
            println!("Max bytes:    {}", settings.max_bytes);
            println!("Max retries:  {}", settings.max_retries);
            println!("Base delay:   {} ms", settings.base_delay_ms);
            println!("User agent:   {}", settings.user_agent);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configFile": path.display().to_string(),
                "exists": path.exists(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    config::save_to(&RetrievalSettings::default(), &path)?;
    info!(path = %path.display(), "Config initialized");
    if !cli.quiet {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
