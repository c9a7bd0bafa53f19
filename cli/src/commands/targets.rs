//! `credsmith targets` — list the built-in service catalog.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::domain::catalog;
use crate::output::human::HumanRenderer;

/// Listings use a placeholder origin; real base URLs come from the config
/// file's host at acquire time.
const PLACEHOLDER_ORIGIN: &str = "http://HOST";

/// Run the targets command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let targets = catalog::all(PLACEHOLDER_ORIGIN);

    if app.is_json() {
        let entries: Vec<serde_json::Value> = targets
            .iter()
            .map(|target| {
                serde_json::json!({
                    "name": target.name,
                    "base_url": target.base_url,
                    "handshake": target.handshake.variant_name(),
                    "probe": target.probe.describe(),
                    "secret_kind": target.secret_kind(),
                    "max_attempts": target.poll.max_attempts,
                    "interval_secs": target.poll.interval.as_secs(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        HumanRenderer::new(&app.output).render_targets(&targets);
    }
    Ok(ExitCode::SUCCESS)
}
