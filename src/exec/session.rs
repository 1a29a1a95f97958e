// src/exec/session.rs

//! One interactive shell process driven over its standard streams.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::framed_reader::spawn_framed_reader;
use super::{FINISH_MESSAGE, SessionError};
use crate::types::StreamKind;

/// Outcome of one command submitted to a [`Session`].
///
/// A nonzero `exit_code` is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// How to start the shell.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Working directory of the shell. `None` keeps the caller's.
    pub dir: Option<PathBuf>,
    /// Environment for the shell. Empty means inherit the caller's.
    pub env: Vec<(String, String)>,
    /// Shell program, looked up on `PATH` unless it is a path.
    pub shell: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dir: None,
            env: Vec::new(),
            shell: "bash".to_string(),
        }
    }
}

impl SessionOptions {
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}

/// A running shell plus the two reader tasks framing its output.
///
/// `run` takes `&mut self`, so a session never has two commands in flight.
/// Always finish with [`Session::close`]; dropping a session kills the child
/// without waiting for it.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout_rx: mpsc::Receiver<String>,
    stderr_rx: mpsc::Receiver<String>,
    readers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    dir: Option<PathBuf>,
}

impl Session {
    /// Start the shell and its stream readers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(options: SessionOptions) -> Result<Self, SessionError> {
        let spawn_err = |source: io::Error| SessionError::Spawn {
            shell: options.shell.clone(),
            source,
        };

        let program = which::which(&options.shell)
            .map_err(|e| spawn_err(io::Error::new(io::ErrorKind::NotFound, e)))?;

        let mut cmd = Command::new(&program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &options.dir {
            cmd.current_dir(dir);
        }
        if !options.env.is_empty() {
            cmd.env_clear();
            cmd.envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut child = cmd.spawn().map_err(spawn_err)?;

        let missing = |what: &str| spawn_err(io::Error::other(format!("child {what} was not piped")));
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        let cancel = CancellationToken::new();
        let (stdout_rx, stdout_reader) =
            spawn_framed_reader(stdout, StreamKind::Stdout, FINISH_MESSAGE, cancel.clone());
        let (stderr_rx, stderr_reader) =
            spawn_framed_reader(stderr, StreamKind::Stderr, FINISH_MESSAGE, cancel.clone());

        info!(
            shell = %program.display(),
            pid = ?child.id(),
            dir = ?options.dir,
            "shell session started"
        );

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout_rx,
            stderr_rx,
            readers: vec![stdout_reader, stderr_reader],
            cancel,
            dir: options.dir,
        })
    }

    /// Working directory the shell was started in, if one was given.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// A handle that aborts any in-flight or future `run` when cancelled.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit `command` and wait for its framed output on both streams.
    pub async fn run(&mut self, command: &str) -> Result<ExecutionResult, SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        let batch = command_batch(command);
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            SessionError::Write(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
        })?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
            res = write_batch(stdin, &batch) => res.map_err(SessionError::Write)?,
        }
        debug!(command, "command submitted");

        let stdout = self.receive(StreamKind::Stdout).await?;
        let stderr = self.receive(StreamKind::Stderr).await?;

        let (stdout, exit_code) = split_exit_code(&stdout)?;
        debug!(exit_code, "command finished");

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code,
        })
    }

    async fn receive(&mut self, kind: StreamKind) -> Result<String, SessionError> {
        let rx = match kind {
            StreamKind::Stdout => &mut self.stdout_rx,
            StreamKind::Stderr => &mut self.stderr_rx,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SessionError::Cancelled),
            msg = rx.recv() => msg.ok_or(SessionError::Closed(kind)),
        }
    }

    /// Stop the readers, ask the shell to exit and reap it.
    pub async fn close(mut self) -> Result<(), SessionError> {
        self.cancel.cancel();

        if let Some(mut stdin) = self.stdin.take() {
            let exit = async {
                stdin.write_all(b"exit 0\n").await?;
                stdin.flush().await
            };
            if let Err(err) = exit.await {
                debug!(error = %err, "shell already gone when sending exit");
            }
        }

        let status = self.child.wait().await.map_err(SessionError::Wait)?;
        debug!(%status, "shell exited");

        for handle in self.readers.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "stream reader task failed");
            }
        }

        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The text written to the shell for one command.
pub(crate) fn command_batch(command: &str) -> String {
    format!(
        "{command}\necho -e \\\\n$?\necho {FINISH_MESSAGE}\necho {FINISH_MESSAGE} >&2\n"
    )
}

async fn write_batch(stdin: &mut ChildStdin, batch: &str) -> io::Result<()> {
    stdin.write_all(batch.as_bytes()).await?;
    stdin.flush().await
}

/// Split the exit-code line off a framed stdout message.
pub(crate) fn split_exit_code(message: &str) -> Result<(String, i32), SessionError> {
    let (body, exit_line) = match message.rfind('\n') {
        Some(idx) => (&message[..idx], &message[idx + 1..]),
        None => ("", message),
    };

    let exit_line = exit_line.trim();
    let exit_code = exit_line
        .parse::<i32>()
        .map_err(|source| SessionError::Protocol {
            exit_line: exit_line.to_string(),
            source,
        })?;

    Ok((body.trim().to_string(), exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_appends_status_and_sentinels() {
        let batch = command_batch("ls");
        assert_eq!(
            batch,
            "ls\necho -e \\\\n$?\n\
             echo testmd/exec/Session.const.finish\n\
             echo testmd/exec/Session.const.finish >&2\n"
        );
    }

    #[test]
    fn split_exit_code_trims_body() {
        let (out, code) = split_exit_code("  hello\nworld \n\n0").unwrap();
        assert_eq!(out, "hello\nworld");
        assert_eq!(code, 0);

        let (out, code) = split_exit_code("\n127").unwrap();
        assert_eq!(out, "");
        assert_eq!(code, 127);
    }

    #[test]
    fn split_exit_code_rejects_garbage() {
        let err = split_exit_code("output\nnot-a-number").unwrap_err();
        match err {
            SessionError::Protocol { exit_line, .. } => assert_eq!(exit_line, "not-a-number"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn options_builder_collects_env() {
        let opts = SessionOptions::default()
            .with_dir("/tmp")
            .with_env("A", "1")
            .with_env("B", "2")
            .with_shell("sh");
        assert_eq!(opts.dir.as_deref(), Some(Path::new("/tmp")));
        assert_eq!(opts.env.len(), 2);
        assert_eq!(opts.shell, "sh");
    }
}
