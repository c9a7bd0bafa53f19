//! Service target descriptions and pure helpers for building the remote
//! commands an acquisition needs.
//!
//! This module is intentionally free of I/O, async, and external layer
//! imports. All functions take data in and return data out.

use std::time::Duration;

use credsmith_common::SecretKind;

// ── Readiness probes ──────────────────────────────────────────────────────────

/// How to decide whether a service has finished starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Unauthenticated HTTP GET. Ready when the status is in
    /// `accept_statuses` and, if set, the body contains `body_contains`.
    Http {
        path: String,
        accept_statuses: Vec<u16>,
        body_contains: Option<String>,
    },
    /// Remote shell command. Ready when it exits 0 and its stdout contains
    /// `expect`.
    RemoteCommand { command: String, expect: String },
}

impl Probe {
    /// One-line description for the `targets` listing.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Http {
                path,
                accept_statuses,
                ..
            } => {
                let statuses: Vec<String> =
                    accept_statuses.iter().map(ToString::to_string).collect();
                format!("GET {path} -> {}", statuses.join("/"))
            }
            Self::RemoteCommand { command, expect } => format!("`{command}` prints '{expect}'"),
        }
    }
}

// ── Polling policy ────────────────────────────────────────────────────────────

/// Fixed-interval polling budget for readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    /// Upper bound on readiness wall-clock time.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

// ── Bootstrap secret location ─────────────────────────────────────────────────

/// Where a service writes its generated bootstrap secret, and how to go
/// looking for it when the well-known path is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReadSpec {
    /// Well-known absolute path of the generated secret file.
    pub primary_path: String,
    /// File name to search for when the primary path is absent.
    pub file_name: String,
    /// Roots for the bounded fallback search.
    pub search_roots: Vec<String>,
    /// Docker container to exec into when the file lives inside one.
    pub container: Option<String>,
}

impl FileReadSpec {
    /// Command that prints the secret file at its well-known path.
    #[must_use]
    pub fn read_primary_command(&self) -> String {
        self.shell(&format!("cat {}", self.primary_path))
    }

    /// Command that prints the first fallback path matching `file_name`
    /// under the configured search roots, or nothing.
    #[must_use]
    pub fn search_command(&self) -> String {
        let roots = self.search_roots.join(" ");
        self.shell(&format!(
            "find {roots} -name \"{name}\" -type f 2>/dev/null | head -n 1",
            name = self.file_name
        ))
    }

    /// Command that prints the secret file at a path found by the search.
    #[must_use]
    pub fn read_file_command(&self, path: &str) -> String {
        self.shell(&format!("cat {path}"))
    }

    // Commands sent over SSH/SSM run in a remote shell already; only the
    // docker hop needs an explicit `sh -c` so pipelines survive. Inner
    // commands use double quotes exclusively, so single-quote wrapping is
    // safe here.
    fn shell(&self, cmd: &str) -> String {
        match &self.container {
            Some(container) => format!("docker exec {container} sh -c '{cmd}'"),
            None => cmd.to_string(),
        }
    }
}

// ── Handshake variants ────────────────────────────────────────────────────────

/// The service-specific procedure that turns a healthy service into a
/// usable credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// Read a generated password file from the service's filesystem.
    FileRead(FileReadSpec),
    /// Assume the documented default login; the authenticated check decides.
    DefaultLogin { password: String },
    /// Read the bootstrap password file-read-style (falling back to the
    /// documented default when present), then mint a durable token through
    /// the service's scripting API.
    ScriptConsole {
        bootstrap: FileReadSpec,
        fallback_password: Option<String>,
    },
}

impl Handshake {
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::FileRead(_) => "file-read",
            Self::DefaultLogin { .. } => "default-login",
            Self::ScriptConsole { .. } => "script-console",
        }
    }
}

// ── Token minting ─────────────────────────────────────────────────────────────

/// Token/service-account API binding for services that mint durable tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenMinter {
    /// Groovy script POSTed to `/scriptText`; revokes any same-named token
    /// before generating a fresh one (rotate on overwrite).
    JenkinsScriptConsole { token_name: String },
    /// Service account via `/api/serviceaccounts`, token minted per-run with
    /// a timestamp-suffixed name.
    GrafanaServiceAccount { account_name: String },
}

// ── Verification ──────────────────────────────────────────────────────────────

/// How the final credential authenticates against the canonical read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
}

/// One authenticated request proving the credential works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyProbe {
    pub path: String,
    pub expect_status: u16,
    pub auth: AuthScheme,
}

// ── Service target ────────────────────────────────────────────────────────────

/// Everything the acquirer needs to know about one service. Immutable,
/// supplied by the caller (catalog entry, possibly overridden by config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub name: String,
    /// Scheme, host, and port, no trailing slash (e.g. `http://10.0.0.5:8080`).
    pub base_url: String,
    pub username: String,
    pub probe: Probe,
    pub poll: PollPolicy,
    pub handshake: Handshake,
    pub minter: Option<TokenMinter>,
    pub verify: VerifyProbe,
}

impl ServiceTarget {
    /// Join a path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Output key kind: services that mint end up with a token, the rest
    /// report the extracted password.
    #[must_use]
    pub fn secret_kind(&self) -> SecretKind {
        if self.minter.is_some() {
            SecretKind::Token
        } else {
            SecretKind::Password
        }
    }
}
