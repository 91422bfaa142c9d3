//! Validate command - Validate a templates directory against the server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::{Cli, CommandError};
use crate::output;

#[derive(Args)]
pub struct ValidateArgs {
    /// Directory containing templates and layouts
    #[arg(value_name = "TEMPLATES_DIRECTORY")]
    pub templates_directory: PathBuf,
}

pub async fn execute(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    info!("Validating templates in {:?}", args.templates_directory);
    let client = cli.client()?;

    let report = postbox_sync::validate_dir(&client, &args.templates_directory, &cli.dispatch_options())
        .await
        .context("Failed to validate templates")?;

    if report.is_success() {
        println!("✅ Validation passed!");
        return Ok(());
    }

    output::print_report(&report);
    Err(CommandError::ReportFailed {
        failed: report.rows.len(),
    }
    .into())
}
