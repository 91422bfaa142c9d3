//! postbox CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General or remote error
//! - 2: Invalid arguments or templates directory
//! - 3: Validation failure (reported problems, invalid templates)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{Cli, CommandError, Commands};
use postbox_manifest::ManifestError;
use postbox_sync::SyncError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "postbox=debug"
    } else if cli.quiet {
        "postbox=error"
    } else {
        "postbox=info"
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in [level, "warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match &cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &cli).await,
        Commands::Push(args) => commands::push::execute(args, &cli).await,
        Commands::Pull(args) => commands::pull::execute(args, &cli).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            // The report has already been printed.
            if !matches!(
                e.downcast_ref::<CommandError>(),
                Some(CommandError::ReportFailed { .. })
            ) {
                eprintln!("❌ Error: {:#}", e);
            }
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(CommandError::ReportFailed { .. }) = e.downcast_ref::<CommandError>() {
        return ExitCodes::VALIDATION_FAILURE;
    }
    if let Some(CommandError::MissingToken | CommandError::NothingSelected) =
        e.downcast_ref::<CommandError>()
    {
        return ExitCodes::INVALID_ARGS;
    }

    match e.downcast_ref::<SyncError>() {
        Some(SyncError::Manifest(ManifestError::PathNotFound(_)))
        | Some(SyncError::EmptyManifest(_)) => ExitCodes::INVALID_ARGS,
        Some(SyncError::Manifest(_)) => ExitCodes::VALIDATION_FAILURE,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
