//! `credsmith acquire` — poll, extract/mint, verify, and print credentials.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use credsmith_common::{RunReport, render_env_block};

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::run::run_acquisitions;
use crate::domain::ChannelConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::http::ReqwestGateway;
use crate::infra::ssh::SshChannel;
use crate::infra::ssm::SsmChannel;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::ConsoleReporter;

/// Arguments for the acquire command.
#[derive(Args)]
pub struct AcquireArgs {
    /// Acquire only the named service; repeatable (default: all configured)
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Wall-clock budget for the whole run, in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Write the env block to this file with 0600 permissions
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Run the acquire command.
///
/// # Errors
///
/// Returns an error on config problems (missing file, unknown service,
/// invalid fields). Per-service failures never error; they appear as
/// sentinel values in the output. Total channel failure exits 2.
pub async fn run(app: &AppContext, args: &AcquireArgs) -> Result<ExitCode> {
    let config = app.store.load()?;
    let targets = config.resolve_targets(&args.services)?;
    let deadline = args
        .deadline
        .map_or_else(|| config.deadline(), Duration::from_secs);

    let http = ReqwestGateway::new(config.channel.timeout())?;
    let runner = TokioCommandRunner::new(config.channel.timeout());
    let reporter = ConsoleReporter::with_spinner(
        &app.output,
        &format!(
            "acquiring credentials on {} over {}",
            config.host,
            config.channel.kind_name()
        ),
    );

    let report = match &config.channel {
        ChannelConfig::Ssh {
            user,
            key_path,
            timeout_secs,
        } => {
            let channel = SshChannel::new(
                runner,
                user,
                &config.host,
                key_path,
                Duration::from_secs(*timeout_secs),
            );
            run_acquisitions(&targets, &channel, &http, &reporter, deadline).await
        }
        ChannelConfig::Ssm {
            instance_id,
            region,
            timeout_secs,
        } => {
            let channel = SsmChannel::new(
                runner,
                instance_id,
                region,
                Duration::from_secs(*timeout_secs),
            );
            run_acquisitions(&targets, &channel, &http, &reporter, deadline).await
        }
    };
    reporter.clear();

    emit(app, args, &report)?;

    if report.total_channel_failure() {
        app.output
            .error(&format!("host {} unreachable for every service", config.host));
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the report: JSON or human summary plus the env block. The env
/// block is the machine-readable product and survives `--quiet`; `--output`
/// redirects it to a 0600 file instead of stdout.
fn emit(app: &AppContext, args: &AcquireArgs, report: &RunReport) -> Result<()> {
    let block = render_env_block(&report.records);

    if let Some(path) = &args.output {
        crate::infra::fs::write_secret_file(path, &block)?;
    }

    if app.is_json() {
        println!("{}", json::format_report(report)?);
        return Ok(());
    }

    if let Some(path) = &args.output {
        app.output
            .success(&format!("credential block written to {}", path.display()));
    }
    HumanRenderer::new(&app.output).render_report(report);
    if args.output.is_none() {
        if !app.output.quiet {
            println!();
        }
        print!("{block}");
    }
    Ok(())
}
