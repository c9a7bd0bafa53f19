//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{ChannelError, RunConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Captured output of one remote command.
///
/// A non-zero exit code is data, not an error: transport failures are
/// `ChannelError`, remote command failures come back here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// HTTP methods the acquirer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Authentication applied to one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Request body variants the service APIs require.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A value-typed HTTP request, built with the `with_*` helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub auth: Auth,
    pub headers: Vec<(String, String)>,
    pub body: HttpBody,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            auth: Auth::None,
            headers: Vec::new(),
            body: HttpBody::Empty,
        }
    }

    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = HttpBody::Json(body);
        self
    }

    #[must_use]
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = HttpBody::Form(fields);
        self
    }
}

/// Status and body of an HTTP response. Statuses are never errors at this
/// layer; callers interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.body)
            .map_err(|err| anyhow::anyhow!("response body is not JSON: {err}"))
    }
}

// ── Remote Channel Port ───────────────────────────────────────────────────────

/// Remote execution channel into the provisioned host (SSH or SSM).
///
/// One acquisition borrows a channel for its duration; implementations
/// enforce the configured per-call timeout.
#[allow(async_fn_in_trait)]
pub trait RemoteChannel {
    /// Run a shell command on the host and capture its output.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError` only for transport failures (host unreachable,
    /// command never delivered, per-call timeout). Non-zero remote exit codes
    /// are reported in `ExecOutput`.
    async fn exec(&self, command: &str) -> Result<ExecOutput, ChannelError>;
}

// ── HTTP Gateway Port ─────────────────────────────────────────────────────────

/// HTTP access to the services on the host.
#[allow(async_fn_in_trait)]
pub trait HttpGateway {
    /// Issue one HTTP request.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Transport` when no response was obtained
    /// (connection refused, reset, timeout). Any received status is `Ok`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ChannelError>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Config Store Port ─────────────────────────────────────────────────────────

/// Abstracts run-configuration loading.
pub trait ConfigStore {
    /// Load the run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file exists or it does not parse.
    fn load(&self) -> Result<RunConfig>;

    /// The path the configuration is read from.
    ///
    /// # Errors
    ///
    /// Returns an error if no candidate path can be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
