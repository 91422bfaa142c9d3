//! Push command - Push local templates to the server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use postbox_sync::{PlanOptions, PushOptions};

use super::{Cli, CommandError};
use crate::output;

#[derive(Args)]
pub struct PushArgs {
    /// Directory containing templates and layouts
    #[arg(value_name = "TEMPLATES_DIRECTORY")]
    pub templates_directory: PathBuf,

    /// Aliases of the templates to push
    #[arg(value_name = "ALIAS", conflicts_with = "all")]
    pub aliases: Vec<String>,

    /// Push every template in the directory
    #[arg(short, long)]
    pub all: bool,

    /// Overwrite templates that differ on the server
    #[arg(short, long)]
    pub force: bool,

    /// Show what would change without pushing
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: &PushArgs, cli: &Cli) -> Result<()> {
    if !args.all && args.aliases.is_empty() {
        return Err(CommandError::NothingSelected.into());
    }

    let plan = if args.all {
        PlanOptions::all()
    } else {
        PlanOptions::only(args.aliases.iter().cloned())
    }
    .force(args.force);

    let options = PushOptions {
        plan,
        dispatch: cli.dispatch_options(),
        dry_run: args.dry_run,
    };

    info!("Pushing templates from {:?}", args.templates_directory);
    let client = cli.client()?;
    let outcome = postbox_sync::push_dir(&client, &args.templates_directory, &options)
        .await
        .context("Failed to push templates")?;

    output::print_plan(&outcome.plan, args.dry_run);

    if outcome.report.is_success() {
        if !args.dry_run {
            output::print_push_summary(&outcome.report);
        }
        return Ok(());
    }

    output::print_report(&outcome.report);
    Err(CommandError::ReportFailed {
        failed: outcome.report.rows.len(),
    }
    .into())
}
