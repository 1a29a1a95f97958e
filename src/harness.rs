// src/harness.rs

//! Runtime support for generated test suites.
//!
//! A [`Suite`] owns every shell runner a generated suite opens and the stack
//! of cleanup commands registered along the way. Scopes mark a point on both
//! stacks; ending a scope unwinds everything registered after it.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::errors::{Result, TestmdError};
use crate::exec::{ExecutionResult, Runner, Session, SessionOptions};

/// Handle to a runner opened through [`Suite::runner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunnerId(usize);

/// Marker returned by [`Suite::begin_scope`].
#[derive(Debug)]
#[must_use = "a scope must be passed to Suite::end_scope"]
pub struct Scope {
    cleanups: usize,
    runners: usize,
}

pub struct Suite {
    config: RunnerConfig,
    runners: Vec<Option<Runner<Session>>>,
    cleanups: Vec<(RunnerId, Vec<String>)>,
}

impl Suite {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            runners: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    /// Default settings overridden by `TESTMD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(RunnerConfig::from_env()?))
    }

    /// Settings baked in at generation time, still overridable from the
    /// environment.
    pub fn configured(timeout_ms: u64, poll_interval_ms: u64, shell: &str) -> Result<Self> {
        let base = RunnerConfig {
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms),
            shell: shell.to_string(),
            base_dir: None,
        };
        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Open a shell in `dir` and keep it until the current scope ends.
    pub fn runner(&mut self, dir: impl AsRef<Path>) -> Result<RunnerId> {
        let dir = self.config.resolve_dir(dir.as_ref());
        let options = SessionOptions::default()
            .with_dir(&dir)
            .with_shell(self.config.shell.clone());

        let session = Session::open(options)?;
        let runner = Runner::new(session, self.config.policy()).with_label(dir.display().to_string());

        let id = RunnerId(self.runners.len());
        self.runners.push(Some(runner));
        debug!(runner = id.0, dir = %dir.display(), "runner opened");
        Ok(id)
    }

    /// Run `command` on a runner, retrying until it exits 0.
    pub async fn run(&mut self, id: RunnerId, command: &str) -> Result<ExecutionResult> {
        let runner = self
            .runners
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TestmdError::UnknownRunner(id.0))?;
        Ok(runner.run(command).await?)
    }

    /// Register commands to run, in order, when the current scope ends.
    pub fn cleanup<S: AsRef<str>>(&mut self, id: RunnerId, commands: &[S]) {
        if commands.is_empty() {
            return;
        }
        let commands = commands.iter().map(|c| c.as_ref().to_string()).collect();
        self.cleanups.push((id, commands));
    }

    pub fn begin_scope(&self) -> Scope {
        Scope {
            cleanups: self.cleanups.len(),
            runners: self.runners.len(),
        }
    }

    /// Run the cleanups registered since `scope` began (latest first), then
    /// close the runners opened since then.
    ///
    /// Everything is attempted; the first failure is returned.
    pub async fn end_scope(&mut self, scope: Scope) -> Result<()> {
        let mut first_err: Option<TestmdError> = None;

        let start = scope.cleanups.min(self.cleanups.len());
        let pending: Vec<_> = self.cleanups.drain(start..).collect();
        for (id, commands) in pending.into_iter().rev() {
            for command in &commands {
                if let Err(err) = self.run(id, command).await {
                    warn!(runner = id.0, error = %err, "cleanup failed: {command}");
                    first_err.get_or_insert(err);
                    break;
                }
            }
        }

        let start = scope.runners.min(self.runners.len());
        for slot in self.runners[start..].iter_mut().rev() {
            let Some(runner) = slot.take() else {
                continue;
            };
            let label = runner.label().to_string();
            if let Err(err) = runner.close().await {
                warn!(runner = %label, error = %err, "failed to close runner");
                first_err.get_or_insert(err.into());
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// End the outermost scope: every cleanup and every runner.
    pub async fn teardown(&mut self) -> Result<()> {
        info!(
            cleanups = self.cleanups.len(),
            runners = self.runners.iter().flatten().count(),
            "tearing down suite"
        );
        self.end_scope(Scope {
            cleanups: 0,
            runners: 0,
        })
        .await
    }
}
