//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Sentinel strings exist only at the output boundary
//! (`credsmith_common::sentinel`); inside the crate failures stay typed.

use std::time::Duration;

use credsmith_common::FailureKind;
use thiserror::Error;

// ── Channel errors ────────────────────────────────────────────────────────────

/// Transport-level failures of the remote execution channel.
///
/// `Unreachable` means the host itself did not answer (SSH exit 255, SSM
/// invocation never registered); `Transport` covers everything else that went
/// wrong before the remote command could report an exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("remote host unreachable: {0}")]
    Unreachable(String),

    #[error("remote channel failure: {0}")]
    Transport(String),
}

// ── Readiness errors ──────────────────────────────────────────────────────────

/// The service never became healthy within its polling budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not ready after {attempts} attempts ({elapsed:?} elapsed)")]
pub struct TimeoutError {
    /// Probes actually issued — always equals the target's `max_attempts`.
    pub attempts: u32,
    pub elapsed: Duration,
}

// ── Extraction errors ─────────────────────────────────────────────────────────

/// No bootstrap secret could be found or derived.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Neither the primary path nor the fallback search located the file.
    #[error("bootstrap secret not found at {primary} or via fallback search")]
    NotFound { primary: String },

    /// The documented default login was rejected by the service.
    #[error("default credentials rejected by {url} (status {status})")]
    DefaultRejected { url: String, status: u16 },

    /// The channel failed before extraction could say anything about the secret.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

// ── Minting errors ────────────────────────────────────────────────────────────

/// The named steps of the token-minting sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStep {
    Authenticate,
    Csrf,
    CreateIdentity,
    ParseIdentity,
    MintToken,
    ParseToken,
}

impl MintStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Csrf => "csrf",
            Self::CreateIdentity => "create-identity",
            Self::ParseIdentity => "parse-identity",
            Self::MintToken => "mint-token",
            Self::ParseToken => "parse-token",
        }
    }
}

impl std::fmt::Display for MintStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The token-minting API sequence failed at a named step, after its one
/// soft retry was spent.
#[derive(Debug, Error)]
#[error("token minting failed at step '{step}': {reason}")]
pub struct MintError {
    pub step: MintStep,
    pub reason: String,
}

impl MintError {
    #[must_use]
    pub fn new(step: MintStep, reason: impl Into<String>) -> Self {
        Self {
            step,
            reason: reason.into(),
        }
    }
}

// ── Verification errors ───────────────────────────────────────────────────────

/// A secret was obtained but failed the authenticated check against the
/// service's own API. Carries the raw response for operator debugging.
#[derive(Debug, Error)]
#[error("verification against {url} failed with status {status}")]
pub struct VerificationError {
    pub url: String,
    pub status: u16,
    /// Response body, truncated by the caller.
    pub body: String,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors from run-configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown service '{name}'.\n\nKnown services: {valid}")]
    UnknownService { name: String, valid: String },

    #[error("No services selected — configure at least one target.")]
    NoServices,

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

// ── Acquisition umbrella ──────────────────────────────────────────────────────

/// Any failure that terminates one service's acquisition.
///
/// Local to that service: the caller converts it into a failed
/// `CredentialRecord` and carries on with sibling acquisitions.
#[derive(Debug, Error)]
pub enum AcquireFailure {
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Mint(#[from] MintError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The run's wall-clock deadline fired while this acquisition was in flight.
    #[error("run deadline of {0:?} exceeded")]
    Deadline(Duration),
}

impl AcquireFailure {
    /// Classify for the output boundary (sentinel selection and exit-code
    /// accounting).
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Extraction(ExtractionError::NotFound { .. }) => FailureKind::Extraction,
            Self::Extraction(ExtractionError::DefaultRejected { .. }) => {
                FailureKind::DefaultRejected
            }
            Self::Extraction(ExtractionError::Channel(_)) | Self::Channel(_) => {
                FailureKind::Channel
            }
            Self::Mint(_) => FailureKind::Mint,
            Self::Verification(_) => FailureKind::Verification,
            Self::Deadline(_) => FailureKind::Deadline,
        }
    }
}
