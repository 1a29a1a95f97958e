// src/exec/retry.rs

//! Run a command until it succeeds or a deadline passes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use super::channel::CommandChannel;
use super::session::{ExecutionResult, Session};
use super::{RetryError, SessionError};

/// How often and for how long a failing command is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(60),
        }
    }
}

/// A command channel plus the policy used to retry commands on it.
pub struct Runner<C> {
    channel: C,
    policy: RetryPolicy,
    label: String,
}

impl<C: CommandChannel> Runner<C> {
    pub fn new(channel: C, policy: RetryPolicy) -> Self {
        Self {
            channel,
            policy,
            label: String::new(),
        }
    }

    /// Name attached to every log line of this runner (usually its directory).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Submit `command` until it exits 0.
    ///
    /// A nonzero exit is retried every `poll_interval` until `timeout` has
    /// elapsed since the first attempt. Channel errors are returned at once.
    pub async fn run(&mut self, command: &str) -> Result<ExecutionResult, RetryError> {
        let deadline = Instant::now() + self.policy.timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            info!(runner = %self.label, stream = "stdin", attempt = attempts, "{command}");

            let result = self.channel.execute(command).await?;

            if !result.stdout.is_empty() {
                info!(runner = %self.label, stream = "stdout", "{}", result.stdout);
            }
            if !result.stderr.is_empty() {
                info!(runner = %self.label, stream = "stderr", "{}", result.stderr);
            }
            if result.exit_code == 0 {
                return Ok(result);
            }

            info!(runner = %self.label, exit_code = result.exit_code, "command failed");

            if Instant::now() >= deadline {
                error!(
                    runner = %self.label,
                    exit_code = result.exit_code,
                    attempts,
                    timeout = ?self.policy.timeout,
                    "giving up on command '{command}'"
                );
                return Err(RetryError::DeadlineExceeded {
                    command: command.to_string(),
                    exit_code: result.exit_code,
                    attempts,
                });
            }

            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }
}

impl Runner<Session> {
    /// Close the underlying shell session.
    pub async fn close(self) -> Result<(), SessionError> {
        self.channel.close().await
    }
}
