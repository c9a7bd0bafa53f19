//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Acquire and verify bootstrap credentials for provisioned services
#[derive(Parser)]
#[command(
    name = "credsmith",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Verbose diagnostics on stderr (debug-level tracing)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $CREDSMITH_CONFIG, then ~/.credsmith/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll services, extract or mint credentials, verify, and print them
    Acquire(commands::acquire::AcquireArgs),

    /// List the built-in service catalog
    Targets,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error on usage or configuration problems. Per-service
    /// acquisition failures are not errors; they degrade to sentinel values
    /// in the output.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            config,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            json,
            config,
        });
        match command {
            Command::Acquire(args) => commands::acquire::run(&app, &args).await,
            Command::Targets => commands::targets::run(&app),
            Command::Version => Ok(commands::version::run(&app)),
        }
    }
}
