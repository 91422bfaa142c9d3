//! Pull command - Download the server's templates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use postbox_sync::PullOptions;

use super::{Cli, CommandError};
use crate::output;

#[derive(Args)]
pub struct PullArgs {
    /// Directory to write templates and layouts to
    #[arg(value_name = "OUTPUT_DIRECTORY")]
    pub output_directory: PathBuf,

    /// Replace templates that already exist locally
    #[arg(short, long)]
    pub overwrite: bool,
}

pub async fn execute(args: &PullArgs, cli: &Cli) -> Result<()> {
    info!("Pulling templates into {:?}", args.output_directory);
    let client = cli.client()?;

    let options = PullOptions {
        output_dir: args.output_directory.clone(),
        overwrite: args.overwrite,
        dispatch: cli.dispatch_options(),
    };
    let report = postbox_sync::pull(&client, &options)
        .await
        .context("Failed to pull templates")?;

    println!(
        "✅ Pulled {} {}",
        report.success_count,
        output::pluralize(report.success_count, "template", "templates")
    );
    if report.skipped_count > 0 {
        println!(
            "⚠️  Skipped {} existing {}. Use --overwrite to replace them.",
            report.skipped_count,
            output::pluralize(report.skipped_count, "template", "templates")
        );
    }

    if report.is_success() {
        return Ok(());
    }

    output::print_report(&report);
    Err(CommandError::ReportFailed {
        failed: report.rows.len(),
    }
    .into())
}
