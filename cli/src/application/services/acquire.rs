//! Application service — one service's full acquisition use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use tokio::time::Instant;

use credsmith_common::{CredentialRecord, VerificationStatus};

use crate::application::ports::{HttpGateway, ProgressReporter, RemoteChannel};
use crate::application::services::{extract, mint, readiness, verify};
use crate::domain::{AcquireFailure, Phase, ServiceTarget};

/// Drive one service through
/// `Provisioning → Polling → SecretExtraction → (TokenMinting) →
/// Verification → {Verified, Failed}`.
///
/// Total by construction: every failure is caught, classified, and folded
/// into a failed [`CredentialRecord`] so sibling acquisitions and the
/// aggregate output are never disturbed.
pub async fn acquire_service(
    target: &ServiceTarget,
    channel: &impl RemoteChannel,
    http: &impl HttpGateway,
    reporter: &impl ProgressReporter,
) -> CredentialRecord {
    let started = Instant::now();
    let mints_token = target.minter.is_some();
    let mut phase = Phase::Provisioning;

    phase = enter_next(&target.name, phase, mints_token);
    reporter.step(&format!("{}: waiting until ready", target.name));
    let ready = match readiness::wait_until_ready(target, channel, http).await {
        Ok(ready) => ready,
        Err(err) => {
            let attempts = err.attempts;
            return fail(target, reporter, phase, err.into(), attempts, started);
        }
    };
    reporter.step(&format!(
        "{}: ready after {} probe(s)",
        target.name, ready.attempts
    ));

    phase = enter_next(&target.name, phase, mints_token);
    let bootstrap_secret = match extract::extract_initial_secret(target, channel, http).await {
        Ok(secret) => secret,
        Err(err) => return fail(target, reporter, phase, err.into(), ready.attempts, started),
    };

    phase = enter_next(&target.name, phase, mints_token);
    let secret = match &target.minter {
        Some(minter) => {
            reporter.step(&format!("{}: minting durable token", target.name));
            match mint::mint_durable_token(target, minter, &bootstrap_secret, http).await {
                Ok(token) => {
                    phase = enter_next(&target.name, phase, mints_token);
                    token
                }
                Err(err) => {
                    return fail(target, reporter, phase, err.into(), ready.attempts, started);
                }
            }
        }
        None => bootstrap_secret,
    };

    debug_assert_eq!(phase, Phase::Verification);
    reporter.step(&format!("{}: verifying credential", target.name));
    match verify::verify_credential(target, &secret, http).await {
        Ok(()) => {
            enter_next(&target.name, phase, mints_token);
            reporter.success(&format!("{}: credential verified", target.name));
            CredentialRecord {
                service: target.name.clone(),
                base_url: target.base_url.clone(),
                username: target.username.clone(),
                secret,
                secret_kind: target.secret_kind(),
                status: VerificationStatus::Verified,
                failure: None,
                detail: None,
                poll_attempts: 0,
                elapsed_ms: 0,
            }
            .with_polling(ready.attempts, elapsed_ms(started))
        }
        Err(err) => fail(target, reporter, phase, err.into(), ready.attempts, started),
    }
}

/// Advance the phase machine, logging the transition.
fn enter_next(service: &str, current: Phase, mints_token: bool) -> Phase {
    let next = current.advance(mints_token).unwrap_or(Phase::Failed);
    tracing::debug!(service, from = %current, to = %next, "phase");
    next
}

/// Fold a failure into a terminal record. The phase machine lands on
/// `Failed`, the secret field on the failure's sentinel.
fn fail(
    target: &ServiceTarget,
    reporter: &impl ProgressReporter,
    phase: Phase,
    failure: AcquireFailure,
    poll_attempts: u32,
    started: Instant,
) -> CredentialRecord {
    debug_assert!(phase.can_transition_to(Phase::Failed));
    tracing::warn!(
        service = %target.name,
        phase = %phase,
        error = %failure,
        "acquisition failed"
    );
    reporter.warn(&format!("{}: {failure}", target.name));
    CredentialRecord::failed(
        &target.name,
        &target.base_url,
        &target.username,
        target.secret_kind(),
        failure.kind(),
        failure.to_string(),
    )
    .with_polling(poll_attempts, elapsed_ms(started))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
