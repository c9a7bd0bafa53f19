//! Run-level report wrapping the records of one acquisition pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{CredentialRecord, FailureKind};

/// Everything one `acquire` run produced, in target order.
///
/// Serialized as-is for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<CredentialRecord>,
}

impl RunReport {
    #[must_use]
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            records,
        }
    }

    /// Number of records that ended verified.
    #[must_use]
    pub fn verified_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_usable()).count()
    }

    /// Number of records that did not end verified.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.len() - self.verified_count()
    }

    /// True when every record failed at the channel layer, meaning the
    /// target host never answered at all. Callers map this to the
    /// infrastructure exit code rather than the partial-failure one.
    #[must_use]
    pub fn total_channel_failure(&self) -> bool {
        !self.records.is_empty()
            && self
                .records
                .iter()
                .all(|r| r.failure == Some(FailureKind::Channel))
    }
}
