//! Human-readable terminal renderer.

use credsmith_common::{CredentialRecord, RunReport};

use crate::domain::ServiceTarget;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the built-in service catalog.
    pub fn render_targets(&self, targets: &[ServiceTarget]) {
        println!("Built-in targets:\n");
        for target in targets {
            println!(
                "  {:<10} {:<15} {:<34} {}",
                target.name,
                target.handshake.variant_name(),
                target.probe.describe(),
                target.secret_kind().env_suffix().to_ascii_lowercase(),
            );
        }
        println!("\nAcquire them: credsmith acquire [--service <name>]");
    }

    /// Render the per-service outcome summary. Secrets appear masked here;
    /// full values live only in the env block, JSON, or `--output` file.
    pub fn render_report(&self, report: &RunReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Acquisition summary");
        for record in &report.records {
            let line = record_line(record);
            if record.is_usable() {
                self.ctx.success(&line);
            } else {
                self.ctx.warn(&line);
            }
        }
        println!();
        self.ctx.kv(
            "Verified:",
            &format!("{}/{}", report.verified_count(), report.records.len()),
        );
    }
}

/// One summary line per record. Never exposes the raw secret.
fn record_line(record: &CredentialRecord) -> String {
    let timing = format!(
        "{} probes, {}s",
        record.poll_attempts,
        record.elapsed_ms / 1000
    );
    if record.is_usable() {
        format!(
            "{:<10} {} {} for {} ({timing})",
            record.service,
            record.secret_kind.env_suffix().to_ascii_lowercase(),
            record.masked_secret(),
            record.username,
        )
    } else {
        let why = record.detail.as_deref().unwrap_or("unknown failure");
        format!("{:<10} {} — {why} ({timing})", record.service, record.secret)
    }
}
