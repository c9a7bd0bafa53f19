use serde::{Deserialize, Serialize};

/// Sentinel values substituted for secrets that could not be acquired.
///
/// Consumers of credsmith output MUST treat these as "manual follow-up
/// required", never as usable credentials. A successful extraction never
/// yields a secret equal to any of these strings.
pub mod sentinel {
    /// No bootstrap secret could be found on the target filesystem.
    pub const EXTRACTION_FAILED: &str = "extraction-failed";

    /// The service rejected its documented default login.
    pub const CREDENTIALS_CHECK_FAILED: &str = "credentials-check-failed";

    /// A bootstrap secret may exist but could not be confirmed or upgraded
    /// (token minting or the remote channel failed mid-handshake).
    pub const CHECK_MANUALLY: &str = "check-manually";

    /// A secret was obtained but failed authenticated verification.
    pub const VERIFICATION_FAILED: &str = "verification-failed";

    /// The service never became ready, or the run deadline fired first.
    pub const TIMED_OUT: &str = "timed-out";

    /// All sentinel values, for consumers that need to filter them out.
    pub const ALL: &[&str] = &[
        EXTRACTION_FAILED,
        CREDENTIALS_CHECK_FAILED,
        CHECK_MANUALLY,
        VERIFICATION_FAILED,
        TIMED_OUT,
    ];

    /// Returns `true` if `value` is one of the documented sentinels.
    #[must_use]
    pub fn is_sentinel(value: &str) -> bool {
        ALL.contains(&value)
    }
}

/// Whether an acquired secret is a password or an API token.
///
/// Selects the env output key: `<SERVICE>_PASSWORD` vs `<SERVICE>_TOKEN`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    Password,
    Token,
}

impl SecretKind {
    /// Env key suffix for this kind of secret.
    #[must_use]
    pub fn env_suffix(self) -> &'static str {
        match self {
            Self::Password => "PASSWORD",
            Self::Token => "TOKEN",
        }
    }
}

/// Verification outcome for an acquired secret.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// No authenticated check has run yet (transient; never emitted).
    Unverified,
    /// An authenticated request against the service's own API succeeded.
    Verified,
    /// Acquisition or verification failed; `secret` holds a sentinel.
    Failed,
}

/// Why an acquisition failed.
///
/// Carried in JSON output so consumers see the precise cause; the env block
/// collapses this to a sentinel value via [`FailureKind::sentinel`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The readiness probe budget was exhausted.
    Timeout,
    /// No bootstrap secret could be found.
    Extraction,
    /// The documented default login was rejected.
    DefaultRejected,
    /// The token-minting API sequence failed.
    Mint,
    /// The acquired secret failed authenticated verification.
    Verification,
    /// The remote execution channel failed.
    Channel,
    /// The overall run deadline cancelled this acquisition.
    Deadline,
}

impl FailureKind {
    /// The sentinel substituted for the secret in env output.
    #[must_use]
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::Timeout | Self::Deadline => sentinel::TIMED_OUT,
            Self::Extraction => sentinel::EXTRACTION_FAILED,
            Self::DefaultRejected => sentinel::CREDENTIALS_CHECK_FAILED,
            Self::Mint | Self::Channel => sentinel::CHECK_MANUALLY,
            Self::Verification => sentinel::VERIFICATION_FAILED,
        }
    }
}

/// The result of one service acquisition.
///
/// Produced once per service per run and never persisted beyond the output
/// channel. `secret` holds a real credential only when `status` is
/// `Verified`; otherwise it is a sentinel from [`sentinel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Service name as configured (e.g. `jenkins`).
    pub service: String,
    /// Base URL the service was reached at.
    pub base_url: String,
    /// Username the secret belongs to.
    pub username: String,
    /// The acquired secret, or a sentinel when acquisition failed.
    pub secret: String,
    /// Whether `secret` is a password or a token.
    pub secret_kind: SecretKind,
    /// Verification outcome.
    pub status: VerificationStatus,
    /// Populated when `status` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Raw diagnostic detail, e.g. the verification response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Readiness probes issued before the service answered (0 if never probed).
    pub poll_attempts: u32,
    /// Wall-clock milliseconds spent on this acquisition.
    pub elapsed_ms: u64,
}

impl CredentialRecord {
    /// Build a failed record: the secret field carries the failure's sentinel.
    #[must_use]
    pub fn failed(
        service: &str,
        base_url: &str,
        username: &str,
        secret_kind: SecretKind,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            service: service.to_owned(),
            base_url: base_url.to_owned(),
            username: username.to_owned(),
            secret: failure.sentinel().to_owned(),
            secret_kind,
            status: VerificationStatus::Failed,
            failure: Some(failure),
            detail: Some(detail.into()),
            poll_attempts: 0,
            elapsed_ms: 0,
        }
    }

    /// Attach readiness-polling stats to the record.
    #[must_use]
    pub fn with_polling(mut self, attempts: u32, elapsed_ms: u64) -> Self {
        self.poll_attempts = attempts;
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// `true` only when verification succeeded and `secret` is a real credential.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.status == VerificationStatus::Verified && !sentinel::is_sentinel(&self.secret)
    }

    /// Secret masked for human display. Sentinels are returned unmasked so
    /// operators can read them.
    #[must_use]
    pub fn masked_secret(&self) -> String {
        if sentinel::is_sentinel(&self.secret) {
            return self.secret.clone();
        }
        mask(&self.secret)
    }
}

/// Mask a secret for display: first four characters followed by `…`.
/// Secrets of four characters or fewer are masked entirely.
#[must_use]
pub fn mask(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "…".to_owned();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}
