//! Infrastructure implementation of the `RemoteChannel` port over AWS SSM.
//!
//! Shells out to the `aws` CLI: `ssm send-command` registers the command,
//! then `ssm get-command-invocation` is polled with capped exponential
//! backoff until the invocation reaches a terminal status. The whole
//! exchange is bounded by the channel's per-call timeout.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::application::ports::{CommandRunner, ExecOutput, RemoteChannel};
use crate::domain::{Backoff, ChannelError};

/// First poll delay after send-command; invocations rarely register faster.
const POLL_INITIAL: Duration = Duration::from_millis(500);
/// Backoff ceiling between polls.
const POLL_CAP: Duration = Duration::from_secs(5);

/// Session-manager command channel into the provisioned instance.
pub struct SsmChannel<R: CommandRunner> {
    runner: R,
    instance_id: String,
    region: String,
    timeout: Duration,
}

impl<R: CommandRunner> SsmChannel<R> {
    pub fn new(
        runner: R,
        instance_id: impl Into<String>,
        region: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            instance_id: instance_id.into(),
            region: region.into(),
            timeout,
        }
    }

    async fn send_command(&self, command: &str, deadline: Instant) -> Result<String, ChannelError> {
        let parameters = serde_json::json!({ "commands": [command] }).to_string();
        let args = [
            "ssm",
            "send-command",
            "--instance-ids",
            self.instance_id.as_str(),
            "--document-name",
            "AWS-RunShellScript",
            "--parameters",
            parameters.as_str(),
            "--region",
            self.region.as_str(),
            "--output",
            "json",
        ];
        let output = self
            .runner
            .run_with_timeout("aws", &args, remaining(deadline))
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChannelError::Unreachable(format!(
                "ssm send-command to {} failed: {}",
                self.instance_id,
                stderr.trim()
            )));
        }

        let body: Value = serde_json::from_slice(&output.stdout).map_err(|err| {
            ChannelError::Transport(format!("unexpected send-command response: {err}"))
        })?;
        body.pointer("/Command/CommandId")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| {
                ChannelError::Transport("send-command response missing CommandId".to_string())
            })
    }

    /// One invocation poll. `Ok(None)` means still running (or not yet
    /// registered); `Ok(Some(_))` is a terminal result.
    async fn poll_invocation(
        &self,
        command_id: &str,
        deadline: Instant,
    ) -> Result<Option<ExecOutput>, ChannelError> {
        let args = [
            "ssm",
            "get-command-invocation",
            "--command-id",
            command_id,
            "--instance-id",
            self.instance_id.as_str(),
            "--region",
            self.region.as_str(),
            "--output",
            "json",
        ];
        let output = self
            .runner
            .run_with_timeout("aws", &args, remaining(deadline))
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // The invocation takes a moment to become queryable after
            // send-command returns.
            if stderr.contains("InvocationDoesNotExist") {
                return Ok(None);
            }
            return Err(ChannelError::Transport(format!(
                "ssm get-command-invocation failed: {}",
                stderr.trim()
            )));
        }

        let body: Value = serde_json::from_slice(&output.stdout).map_err(|err| {
            ChannelError::Transport(format!("unexpected get-command-invocation response: {err}"))
        })?;
        let status = body["Status"].as_str().unwrap_or("Unknown");
        match status {
            "Pending" | "InProgress" | "Delayed" => Ok(None),
            "Success" | "Failed" => {
                let exit_code = body["ResponseCode"]
                    .as_i64()
                    .and_then(|code| i32::try_from(code).ok())
                    .unwrap_or(-1);
                Ok(Some(ExecOutput {
                    stdout: body["StandardOutputContent"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                    stderr: body["StandardErrorContent"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                    exit_code,
                }))
            }
            other => Err(ChannelError::Transport(format!(
                "ssm invocation ended {other}"
            ))),
        }
    }
}

impl<R: CommandRunner> RemoteChannel for SsmChannel<R> {
    async fn exec(&self, command: &str) -> Result<ExecOutput, ChannelError> {
        let deadline = Instant::now() + self.timeout;
        let command_id = self.send_command(command, deadline).await?;
        tracing::trace!(instance = %self.instance_id, %command_id, "ssm command registered");

        let mut backoff = Backoff::new(POLL_INITIAL, POLL_CAP);
        loop {
            let delay = backoff.next().unwrap_or(POLL_CAP);
            if Instant::now() + delay >= deadline {
                return Err(ChannelError::Transport(format!(
                    "ssm invocation {command_id} did not finish within {}s",
                    self.timeout.as_secs()
                )));
            }
            tokio::time::sleep(delay).await;

            if let Some(output) = self.poll_invocation(&command_id, deadline).await? {
                return Ok(output);
            }
        }
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
