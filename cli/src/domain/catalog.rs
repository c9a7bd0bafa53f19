//! Built-in service catalog.
//!
//! Each entry binds one supported service to its real port, readiness
//! endpoint, bootstrap-secret location, and verification probe. Entries are
//! plain [`ServiceTarget`] values; config overrides adjust them per run.

use std::time::Duration;

use crate::domain::target::{
    AuthScheme, FileReadSpec, Handshake, PollPolicy, Probe, ServiceTarget, TokenMinter,
    VerifyProbe,
};

/// Names resolvable without any config entry, in listing order.
pub const BUILTIN_NAMES: [&str; 4] = ["jenkins", "nexus", "grafana", "sonarqube"];

/// Readiness budget shared by all built-in entries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Account name used for minted tokens and service accounts.
const AUTOMATION_NAME: &str = "credsmith";

fn default_poll() -> PollPolicy {
    PollPolicy {
        max_attempts: DEFAULT_MAX_ATTEMPTS,
        interval: DEFAULT_POLL_INTERVAL,
    }
}

/// Build the catalog entry for `name` against `origin`
/// (scheme plus host, e.g. `http://10.0.0.5`). Returns `None` for names not
/// in [`BUILTIN_NAMES`].
#[must_use]
pub fn builtin(name: &str, origin: &str) -> Option<ServiceTarget> {
    let origin = origin.trim_end_matches('/');
    let target = match name {
        "jenkins" => ServiceTarget {
            name: name.to_string(),
            base_url: format!("{origin}:8080"),
            username: "admin".to_string(),
            probe: Probe::Http {
                path: "/login".to_string(),
                accept_statuses: vec![200, 302, 403],
                body_contains: None,
            },
            poll: default_poll(),
            handshake: Handshake::ScriptConsole {
                bootstrap: FileReadSpec {
                    primary_path: "/var/jenkins_home/secrets/initialAdminPassword".to_string(),
                    file_name: "initialAdminPassword".to_string(),
                    search_roots: vec!["/var/jenkins_home".to_string()],
                    container: Some("jenkins".to_string()),
                },
                fallback_password: Some("admin".to_string()),
            },
            minter: Some(TokenMinter::JenkinsScriptConsole {
                token_name: AUTOMATION_NAME.to_string(),
            }),
            verify: VerifyProbe {
                path: "/api/json".to_string(),
                expect_status: 200,
                auth: AuthScheme::Basic,
            },
        },
        "nexus" => ServiceTarget {
            name: name.to_string(),
            base_url: format!("{origin}:8081"),
            username: "admin".to_string(),
            probe: Probe::Http {
                path: "/service/rest/v1/status".to_string(),
                accept_statuses: vec![200],
                body_contains: None,
            },
            poll: default_poll(),
            handshake: Handshake::FileRead(FileReadSpec {
                primary_path: "/nexus-data/admin.password".to_string(),
                file_name: "admin.password".to_string(),
                search_roots: vec!["/nexus-data".to_string(), "/opt".to_string()],
                container: Some("nexus".to_string()),
            }),
            minter: None,
            verify: VerifyProbe {
                path: "/service/rest/v1/status/check".to_string(),
                expect_status: 200,
                auth: AuthScheme::Basic,
            },
        },
        "grafana" => ServiceTarget {
            name: name.to_string(),
            base_url: format!("{origin}:3000"),
            username: "admin".to_string(),
            probe: Probe::Http {
                path: "/api/health".to_string(),
                accept_statuses: vec![200],
                body_contains: None,
            },
            poll: default_poll(),
            handshake: Handshake::DefaultLogin {
                password: "admin".to_string(),
            },
            minter: Some(TokenMinter::GrafanaServiceAccount {
                account_name: AUTOMATION_NAME.to_string(),
            }),
            verify: VerifyProbe {
                path: "/api/org".to_string(),
                expect_status: 200,
                auth: AuthScheme::Bearer,
            },
        },
        "sonarqube" => ServiceTarget {
            name: name.to_string(),
            base_url: format!("{origin}:9000"),
            username: "admin".to_string(),
            probe: Probe::Http {
                path: "/api/system/status".to_string(),
                accept_statuses: vec![200],
                body_contains: Some("\"status\":\"UP\"".to_string()),
            },
            poll: default_poll(),
            handshake: Handshake::DefaultLogin {
                password: "admin".to_string(),
            },
            minter: None,
            verify: VerifyProbe {
                path: "/api/system/health".to_string(),
                expect_status: 200,
                auth: AuthScheme::Basic,
            },
        },
        _ => return None,
    };
    Some(target)
}

/// All built-in entries against `origin`, in listing order.
#[must_use]
pub fn all(origin: &str) -> Vec<ServiceTarget> {
    BUILTIN_NAMES
        .iter()
        .filter_map(|name| builtin(name, origin))
        .collect()
}
