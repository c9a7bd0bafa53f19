//! Credsmith CLI - acquire and verify bootstrap credentials for provisioned services

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use credsmith_cli::cli::Cli;
use credsmith_cli::output;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 1; clap's default of 2 is reserved for total
    // channel failure. Help and version requests still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = u8::from(err.use_stderr());
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    // Diagnostics go to stderr; stdout carries the credential block.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(err) => {
            if json {
                match output::json::format_error(&format!("{err:#}"), "config") {
                    Ok(body) => eprintln!("{body}"),
                    Err(_) => eprintln!("Error: {err:#}"),
                }
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::from(1)
        }
    }
}
