//! Infrastructure implementation of the `RemoteChannel` port over SSH.
//!
//! Shells out to the system `ssh` binary in batch mode, routed through a
//! `CommandRunner` so tests can inject a recording runner instead of
//! spawning real processes.

use std::time::Duration;

use crate::application::ports::{CommandRunner, ExecOutput, RemoteChannel};
use crate::domain::ChannelError;

/// ssh(1) reserves exit code 255 for its own failures (connection refused,
/// auth failure, DNS). Anything else is the remote command's exit code.
const SSH_FAILURE_EXIT: i32 = 255;

/// Key-based SSH channel into the provisioned host.
pub struct SshChannel<R: CommandRunner> {
    runner: R,
    user: String,
    host: String,
    key_path: String,
    timeout: Duration,
}

impl<R: CommandRunner> SshChannel<R> {
    pub fn new(
        runner: R,
        user: impl Into<String>,
        host: impl Into<String>,
        key_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            user: user.into(),
            host: host.into(),
            key_path: key_path.into(),
            timeout,
        }
    }
}

impl<R: CommandRunner> RemoteChannel for SshChannel<R> {
    async fn exec(&self, command: &str) -> Result<ExecOutput, ChannelError> {
        let destination = format!("{}@{}", self.user, self.host);
        let args = [
            "-i",
            self.key_path.as_str(),
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-o",
            "ConnectTimeout=10",
            destination.as_str(),
            command,
        ];
        tracing::trace!(host = %self.host, command, "ssh exec");

        let output = self
            .runner
            .run_with_timeout("ssh", &args, self.timeout)
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if exit_code == SSH_FAILURE_EXIT {
            return Err(ChannelError::Unreachable(format!(
                "ssh to {destination} failed: {}",
                stderr.trim()
            )));
        }
        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
            exit_code,
        })
    }
}
