//! Application service — readiness polling use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{HttpGateway, HttpRequest, RemoteChannel};
use crate::domain::{Probe, ServiceTarget, TimeoutError};

/// Outcome of a successful readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Probes issued before the service answered, first probe counted as 1.
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Poll the target's readiness probe at its fixed interval until it passes.
///
/// Issues exactly `max_attempts` probes before giving up, sleeping only
/// between attempts, so the wall-clock bound is
/// `max_attempts * interval` and a probe that passes on attempt N returns
/// after roughly `(N - 1) * interval`.
///
/// # Errors
///
/// Returns [`TimeoutError`] with `attempts == max_attempts` when the budget
/// is exhausted. Fatal for this service only; callers degrade the record and
/// keep going with sibling services.
pub async fn wait_until_ready(
    target: &ServiceTarget,
    channel: &impl RemoteChannel,
    http: &impl HttpGateway,
) -> Result<Ready, TimeoutError> {
    let started = Instant::now();
    for attempt in 1..=target.poll.max_attempts {
        if probe_once(target, channel, http).await {
            tracing::debug!(service = %target.name, attempt, "service ready");
            return Ok(Ready {
                attempts: attempt,
                elapsed: started.elapsed(),
            });
        }
        tracing::trace!(service = %target.name, attempt, "not ready yet");
        if attempt < target.poll.max_attempts {
            tokio::time::sleep(target.poll.interval).await;
        }
    }
    Err(TimeoutError {
        attempts: target.poll.max_attempts,
        elapsed: started.elapsed(),
    })
}

/// One probe. Transport failures count as "not ready" — services routinely
/// refuse connections while starting up.
async fn probe_once(
    target: &ServiceTarget,
    channel: &impl RemoteChannel,
    http: &impl HttpGateway,
) -> bool {
    match &target.probe {
        Probe::Http {
            path,
            accept_statuses,
            body_contains,
        } => match http.send(HttpRequest::get(target.url(path))).await {
            Ok(response) => {
                accept_statuses.contains(&response.status)
                    && body_contains
                        .as_ref()
                        .is_none_or(|needle| response.body.contains(needle))
            }
            Err(_) => false,
        },
        Probe::RemoteCommand { command, expect } => match channel.exec(command).await {
            Ok(output) => output.success() && output.stdout.contains(expect),
            Err(_) => false,
        },
    }
}
