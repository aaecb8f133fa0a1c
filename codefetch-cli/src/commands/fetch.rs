//! Fetch command - retrieve a remote file (or echo literal code).

use anyhow::Result;
use clap::Args;
use codefetch_core::{CodeEnvelope, Rejection, RetrievedSource, SourceInput, SourceReference};
use codefetch_fetch::{AttemptRecord, CancelToken, Retriever};
use tracing::{debug, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Forge URL, raw URL, or literal code.
    pub input: String,

    /// Include provenance and per-attempt diagnostics in JSON output.
    #[arg(long)]
    pub details: bool,
}

/// What a fetch produced, before formatting.
struct FetchRun {
    envelope: CodeEnvelope,
    rejection: Option<Rejection>,
    source: Option<RetrievedSource>,
    attempts: Vec<AttemptRecord>,
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<()> {
    let retriever = Retriever::new(cli.settings()?)?;

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });

    let fetched = execute(&retriever, &args.input, &cancel).await;
    output(&fetched, args, cli)?;

    if !fetched.envelope.is_success() {
        let code = if cancel.is_cancelled() {
            ExitCode::Interrupted
        } else {
            ExitCode::Error
        };
        std::process::exit(code as i32);
    }

    Ok(())
}

/// Retrieves the input, keeping the attempt records.
async fn execute(retriever: &Retriever, input: &str, cancel: &CancelToken) -> FetchRun {
    let reference = SourceReference::new(input);
    if !reference.is_blank() {
        if let SourceInput::Literal(code) = reference.resolve_input() {
            debug!("Input is not a URL, treating it as code");
            return FetchRun {
                envelope: CodeEnvelope::code(code),
                rejection: None,
                source: None,
                attempts: Vec::new(),
            };
        }
    }

    let detailed = retriever.retrieve_detailed(input, cancel).await;
    match detailed.result {
        Ok(source) => FetchRun {
            envelope: CodeEnvelope::code(source.code.clone()),
            rejection: None,
            source: Some(source),
            attempts: detailed.attempts,
        },
        Err(rejection) => FetchRun {
            envelope: rejection.clone().into(),
            rejection: Some(rejection),
            source: None,
            attempts: detailed.attempts,
        },
    }
}

fn output(run: &FetchRun, args: &FetchArgs, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let json = if args.details {
                formatter.format_details(&run.envelope, run.source.as_ref(), &run.attempts)?
            } else {
                formatter.format_envelope(&run.envelope)?
            };
            println!("{json}");
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if cli.verbose && !run.attempts.is_empty() {
                eprintln!("{}", formatter.format_attempts(&run.attempts));
            }
            if let Some(rejection) = &run.rejection {
                if !cli.quiet {
                    eprintln!("{}", formatter.format_rejection(rejection));
                }
                return Ok(());
            }
            if let (Some(source), false) = (&run.source, cli.quiet) {
                eprintln!("{}", formatter.format_source_header(source));
            }
            if let CodeEnvelope::Code { code } = &run.envelope {
                print!("{code}");
                if !code.ends_with('\n') {
                    println!();
                }
            }
        }
    }
    Ok(())
}
