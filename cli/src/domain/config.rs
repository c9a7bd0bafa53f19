//! Run configuration schema and pure target resolution.
//!
//! Pure functions only — no I/O, no async, no filesystem access. Loading and
//! saving the YAML file lives in `infra::config`.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::catalog;
use crate::domain::error::ConfigError;
use crate::domain::target::{AuthScheme, Handshake, PollPolicy, Probe, ServiceTarget, VerifyProbe};

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_scheme() -> String {
    "http".to_string()
}

fn default_deadline_secs() -> u64 {
    900
}

fn default_services() -> Vec<String> {
    vec![
        "jenkins".to_string(),
        "nexus".to_string(),
        "grafana".to_string(),
    ]
}

fn default_channel_timeout_secs() -> u64 {
    30
}

fn default_custom_username() -> String {
    "admin".to_string()
}

fn default_accept_statuses() -> Vec<u16> {
    vec![200]
}

fn default_verify_status() -> u16 {
    200
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Top-level run configuration stored in `~/.credsmith/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Host name or IP of the provisioned machine.
    pub host: String,
    /// URL scheme for service base URLs.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Remote execution channel into the host.
    pub channel: ChannelConfig,
    /// Wall-clock budget for the whole run, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Services to acquire. Names resolve against the built-in catalog or
    /// the `targets` list below.
    #[serde(default = "default_services")]
    pub services: Vec<String>,
    /// Per-service adjustments, keyed by service name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub overrides: HashMap<String, TargetOverride>,
    /// Services outside the built-in catalog. Custom targets use the
    /// default-login handshake; the file-read and script-console variants
    /// need service-specific bindings and stay catalog-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<CustomTarget>,
}

/// How to reach the provisioned host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelConfig {
    Ssh {
        user: String,
        key_path: String,
        #[serde(default = "default_channel_timeout_secs")]
        timeout_secs: u64,
    },
    Ssm {
        instance_id: String,
        region: String,
        #[serde(default = "default_channel_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ChannelConfig {
    /// Per-call timeout for one remote command.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        let secs = match self {
            Self::Ssh { timeout_secs, .. } | Self::Ssm { timeout_secs, .. } => *timeout_secs,
        };
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ssh { .. } => "ssh",
            Self::Ssm { .. } => "ssm",
        }
    }
}

/// Adjustments applied on top of a resolved target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

/// A default-login service outside the built-in catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTarget {
    pub name: String,
    pub port: u16,
    /// Readiness probe path; ignored when `probe_command` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_path: Option<String>,
    #[serde(default = "default_accept_statuses")]
    pub accept_statuses: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_body_contains: Option<String>,
    /// Remote-command probe: ready when the command exits 0 and prints
    /// `probe_expect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_expect: Option<String>,
    #[serde(default = "default_custom_username")]
    pub username: String,
    pub password: String,
    pub verify_path: String,
    #[serde(default = "default_verify_status")]
    pub verify_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

// ── Resolution ────────────────────────────────────────────────────────────────

impl RunConfig {
    /// Scheme plus host, no port (e.g. `http://10.0.0.5`).
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Check the fields target resolution relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on an empty host, a zero deadline, an empty
    /// service list, or a zero channel timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "host",
                reason: "must not be empty".to_string(),
            });
        }
        if self.deadline_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "deadline_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.channel.timeout().is_zero() {
            return Err(ConfigError::InvalidField {
                field: "channel.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }
        for custom in &self.targets {
            if catalog::BUILTIN_NAMES.contains(&custom.name.as_str()) {
                return Err(ConfigError::InvalidField {
                    field: "targets",
                    reason: format!("'{}' shadows a built-in service", custom.name),
                });
            }
            if custom.probe_command.is_some() != custom.probe_expect.is_some() {
                return Err(ConfigError::InvalidField {
                    field: "targets",
                    reason: format!(
                        "'{}' must set probe_command and probe_expect together",
                        custom.name
                    ),
                });
            }
            if custom.probe_command.is_none() && custom.probe_path.is_none() {
                return Err(ConfigError::InvalidField {
                    field: "targets",
                    reason: format!("'{}' needs probe_path or probe_command", custom.name),
                });
            }
        }
        Ok(())
    }

    /// Resolve the selected service names into full targets.
    ///
    /// `selected` narrows `self.services` when non-empty (CLI `--service`
    /// flags); every name must still be resolvable. Resolution order: custom
    /// `targets` entries first, then the built-in catalog, then overrides on
    /// top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownService`] for names in neither the
    /// catalog nor `targets`, and [`ConfigError`] when validation fails.
    pub fn resolve_targets(&self, selected: &[String]) -> Result<Vec<ServiceTarget>, ConfigError> {
        self.validate()?;
        let names: Vec<&String> = if selected.is_empty() {
            self.services.iter().collect()
        } else {
            selected.iter().collect()
        };

        let origin = self.origin();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let mut target = match self.targets.iter().find(|t| &t.name == name) {
                Some(custom) => self.custom_target(custom),
                None => {
                    catalog::builtin(name, &origin).ok_or_else(|| ConfigError::UnknownService {
                        name: name.clone(),
                        valid: self.known_names().join(", "),
                    })?
                }
            };
            if let Some(over) = self.overrides.get(name) {
                apply_override(&mut target, over);
            }
            resolved.push(target);
        }
        Ok(resolved)
    }

    fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = catalog::BUILTIN_NAMES
            .iter()
            .map(ToString::to_string)
            .collect();
        names.extend(self.targets.iter().map(|t| t.name.clone()));
        names
    }

    fn custom_target(&self, custom: &CustomTarget) -> ServiceTarget {
        let base_url = format!("{}:{}", self.origin(), custom.port);
        let probe = match (&custom.probe_command, &custom.probe_expect) {
            (Some(command), Some(expect)) => Probe::RemoteCommand {
                command: command.clone(),
                expect: expect.clone(),
            },
            _ => Probe::Http {
                path: custom.probe_path.clone().unwrap_or_else(|| "/".to_string()),
                accept_statuses: custom.accept_statuses.clone(),
                body_contains: custom.probe_body_contains.clone(),
            },
        };
        ServiceTarget {
            name: custom.name.clone(),
            base_url,
            username: custom.username.clone(),
            probe,
            poll: PollPolicy {
                max_attempts: custom.max_attempts.unwrap_or(catalog::DEFAULT_MAX_ATTEMPTS),
                interval: custom
                    .interval_secs
                    .map_or(catalog::DEFAULT_POLL_INTERVAL, Duration::from_secs),
            },
            handshake: Handshake::DefaultLogin {
                password: custom.password.clone(),
            },
            minter: None,
            verify: VerifyProbe {
                path: custom.verify_path.clone(),
                expect_status: custom.verify_status,
                auth: AuthScheme::Basic,
            },
        }
    }
}

fn apply_override(target: &mut ServiceTarget, over: &TargetOverride) {
    if let Some(base_url) = &over.base_url {
        target.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(username) = &over.username {
        target.username = username.clone();
    }
    if let Some(max_attempts) = over.max_attempts {
        target.poll.max_attempts = max_attempts;
    }
    if let Some(interval_secs) = over.interval_secs {
        target.poll.interval = Duration::from_secs(interval_secs);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
