//! Per-service acquisition state machine.
//!
//! `Provisioning → Polling → SecretExtraction → (TokenMinting) →
//! Verification → {Verified, Failed}`. Terminal states never transition;
//! within one run there is no retry from a terminal state back to the start.

/// Phase of one service's acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Provisioning,
    Polling,
    SecretExtraction,
    TokenMinting,
    Verification,
    Verified,
    Failed,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }

    /// Whether `next` is a legal successor. Every non-terminal phase may
    /// fail; forward movement follows the fixed order, with `TokenMinting`
    /// skipped for services that do not mint.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Failed {
            return true;
        }
        matches!(
            (self, next),
            (Self::Provisioning, Self::Polling)
                | (Self::Polling, Self::SecretExtraction)
                | (Self::SecretExtraction, Self::TokenMinting | Self::Verification)
                | (Self::TokenMinting, Self::Verification)
                | (Self::Verification, Self::Verified)
        )
    }

    /// Successor on success for a service that does (`mints_token`) or does
    /// not mint a durable token. `None` once terminal.
    #[must_use]
    pub fn advance(self, mints_token: bool) -> Option<Self> {
        match self {
            Self::Provisioning => Some(Self::Polling),
            Self::Polling => Some(Self::SecretExtraction),
            Self::SecretExtraction if mints_token => Some(Self::TokenMinting),
            Self::SecretExtraction => Some(Self::Verification),
            Self::TokenMinting => Some(Self::Verification),
            Self::Verification => Some(Self::Verified),
            Self::Verified | Self::Failed => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Polling => "polling",
            Self::SecretExtraction => "secret-extraction",
            Self::TokenMinting => "token-minting",
            Self::Verification => "verification",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
