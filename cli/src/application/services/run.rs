//! Application service — whole-run orchestration use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use futures_util::future::join_all;

use credsmith_common::{CredentialRecord, FailureKind, RunReport};

use crate::application::ports::{HttpGateway, ProgressReporter, RemoteChannel};
use crate::application::services::acquire::acquire_service;
use crate::domain::{AcquireFailure, ChannelError, ServiceTarget};

/// One cheap remote echo before fanning out, so a dead channel fails the
/// run in seconds instead of burning every target's full polling budget.
///
/// # Errors
///
/// Returns [`ChannelError`] when the transport fails or the echo comes back
/// wrong.
pub async fn preflight(channel: &impl RemoteChannel) -> Result<(), ChannelError> {
    let output = channel.exec("echo ok").await?;
    if output.success() && output.stdout.contains("ok") {
        Ok(())
    } else {
        Err(ChannelError::Unreachable(format!(
            "preflight echo failed: exit {}, stderr: {}",
            output.exit_code,
            output.stderr.trim()
        )))
    }
}

/// Acquire every target concurrently under one wall-clock deadline and
/// collect the records in target order.
///
/// Acquisitions are independent: each polls, extracts, mints, and verifies
/// on its own, and a failure in one never disturbs the others. When the
/// channel preflight fails, every target is reported as a channel failure
/// and nothing is attempted — callers surface that distinctly (exit code 2)
/// via [`RunReport::total_channel_failure`].
pub async fn run_acquisitions(
    targets: &[ServiceTarget],
    channel: &impl RemoteChannel,
    http: &impl HttpGateway,
    reporter: &impl ProgressReporter,
    deadline: Duration,
) -> RunReport {
    if let Err(err) = preflight(channel).await {
        tracing::error!(error = %err, "remote host unreachable, failing every target");
        reporter.warn(&format!("remote host unreachable: {err}"));
        let records = targets
            .iter()
            .map(|target| channel_failed_record(target, &err))
            .collect();
        return RunReport::new(records);
    }

    tracing::info!(
        targets = targets.len(),
        deadline_secs = deadline.as_secs(),
        "starting acquisitions"
    );
    let acquisitions = targets.iter().map(|target| async move {
        match tokio::time::timeout(deadline, acquire_service(target, channel, http, reporter))
            .await
        {
            Ok(record) => record,
            Err(_) => deadline_record(target, deadline),
        }
    });
    let records = join_all(acquisitions).await;
    RunReport::new(records)
}

fn channel_failed_record(target: &ServiceTarget, err: &ChannelError) -> CredentialRecord {
    CredentialRecord::failed(
        &target.name,
        &target.base_url,
        &target.username,
        target.secret_kind(),
        FailureKind::Channel,
        err.to_string(),
    )
}

fn deadline_record(target: &ServiceTarget, deadline: Duration) -> CredentialRecord {
    let failure = AcquireFailure::Deadline(deadline);
    tracing::warn!(service = %target.name, error = %failure, "run deadline fired");
    CredentialRecord::failed(
        &target.name,
        &target.base_url,
        &target.username,
        target.secret_kind(),
        failure.kind(),
        failure.to_string(),
    )
}
