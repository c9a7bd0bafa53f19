//! Flat `KEY=VALUE` rendering of credential records.
//!
//! The env block is the primary machine-readable contract: three lines per
//! service (`<SERVICE>_URL`, `<SERVICE>_USERNAME`, and `<SERVICE>_TOKEN` or
//! `<SERVICE>_PASSWORD` depending on the secret kind), with sentinel values
//! substituted when acquisition failed.

use thiserror::Error;

use crate::record::CredentialRecord;

/// Errors from [`parse_env_block`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvFormatError {
    #[error("line {line}: missing '=' separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },
}

/// Derive the env key prefix for a service name: upper-cased, with any
/// character outside `[A-Za-z0-9]` mapped to `_`.
#[must_use]
pub fn env_prefix(service: &str) -> String {
    service
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render one record as its three env lines, trailing newline included.
#[must_use]
pub fn render_record(record: &CredentialRecord) -> String {
    let prefix = env_prefix(&record.service);
    format!(
        "{prefix}_URL={url}\n{prefix}_USERNAME={user}\n{prefix}_{suffix}={secret}\n",
        url = record.base_url,
        user = record.username,
        suffix = record.secret_kind.env_suffix(),
        secret = record.secret,
    )
}

/// Render the full env block for a run, records in input order.
#[must_use]
pub fn render_env_block(records: &[CredentialRecord]) -> String {
    records.iter().map(render_record).collect()
}

/// Parse an env block back into key/value pairs, preserving order.
///
/// Blank lines are skipped. Values equal to a sentinel (see
/// [`crate::record::sentinel`]) must be treated by consumers as "manual
/// follow-up required", not as usable secrets.
///
/// # Errors
///
/// Returns [`EnvFormatError`] when a non-blank line has no `=` or an empty key.
pub fn parse_env_block(block: &str) -> Result<Vec<(String, String)>, EnvFormatError> {
    let mut pairs = Vec::new();
    for (idx, raw) in block.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let (key, value) = raw
            .split_once('=')
            .ok_or(EnvFormatError::MissingSeparator { line })?;
        if key.is_empty() {
            return Err(EnvFormatError::EmptyKey { line });
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}
