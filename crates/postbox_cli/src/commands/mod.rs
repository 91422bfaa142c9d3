//! CLI command definitions.
//!
//! Each subcommand maps to one sync operation. Server settings are global
//! so they can be supplied once through the environment.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use thiserror::Error;

use postbox_remote::{ClientConfig, ServerClient};
use postbox_sync::DispatchOptions;

pub mod pull;
pub mod push;
pub mod validate;

/// postbox - keep email templates in sync with a Postmark server
#[derive(Parser)]
#[command(name = "postbox")]
#[command(version, about = "postbox - keep email templates in sync with a Postmark server")]
#[command(long_about = r#"
postbox manages the templates and layouts of a Postmark server as files.

COMMANDS:
  validate  → Validate every template in a directory against the server
  push      → Push new and changed templates to the server
  pull      → Download the server's templates into a directory

DIRECTORY LAYOUT:
  <dir>/templates/<alias>/{meta.json,content.html,content.txt}
  <dir>/layouts/<alias>/{meta.json,content.html,content.txt}

EXIT CODES:
  0 - Success
  1 - General or remote error
  2 - Invalid arguments or templates directory
  3 - Validation or sync failures reported
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Server API token
    #[arg(long, global = true, env = "POSTMARK_SERVER_TOKEN", hide_env_values = true)]
    pub server_token: Option<String>,

    /// API host override
    #[arg(long, global = true, env = "POSTMARK_REQUEST_HOST", hide = true)]
    pub request_host: Option<String>,

    /// Maximum concurrent requests (unlimited when omitted)
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = postbox_remote::config::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate templates against the server
    Validate(validate::ValidateArgs),

    /// Push templates to the server
    Push(push::PushArgs),

    /// Pull templates from the server
    Pull(pull::PullArgs),
}

/// Failures that map to specific exit codes.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("A server token is required. Pass --server-token or set POSTMARK_SERVER_TOKEN")]
    MissingToken,

    #[error("No templates selected. Name template aliases or pass --all")]
    NothingSelected,

    #[error("{failed} problem(s) reported")]
    ReportFailed { failed: usize },
}

impl Cli {
    /// Build a server client from the global options.
    pub fn client(&self) -> Result<ServerClient> {
        let token = self
            .server_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(CommandError::MissingToken)?;

        let config = ClientConfig::new(token)
            .request_host(self.request_host.clone())
            .timeout(Duration::from_secs(self.timeout));
        Ok(ServerClient::new(config)?)
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        match self.concurrency {
            Some(limit) => DispatchOptions::bounded(limit),
            None => DispatchOptions::unbounded(),
        }
    }
}
