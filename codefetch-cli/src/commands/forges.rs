//! Forges command - list the URL rewrite rules.

use anyhow::Result;
use codefetch_fetch::ForgeRegistry;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the forges command.
pub fn run(cli: &Cli) -> Result<()> {
    let registry = ForgeRegistry::builtin();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_forges_header());
            println!("{}", "─".repeat(80));
            for rule in registry.rules() {
                println!("{}", formatter.format_forge_line(rule));
            }
            println!();
            println!("Any other host is fetched as given.");
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_forges(registry.rules())?);
        }
    }

    Ok(())
}
