// src/exec/mod.rs

//! Shell execution layer.
//!
//! A [`Session`] owns one long-lived shell process and turns it into a
//! request/response channel: every command is followed by a sentinel line on
//! both output streams, and the [`framed_reader`] tasks cut the streams at
//! those sentinels. The exit status travels as the last line of stdout.
//!
//! - [`framed_reader`] splits a raw stream into sentinel-delimited messages.
//! - [`session`] owns the child process and implements `run` / `close`.
//! - [`channel`] is the [`CommandChannel`] seam the retry driver talks to, so
//!   tests can swap in a scripted fake.
//! - [`retry`] re-submits a command until it exits 0 or a deadline passes.

use std::num::ParseIntError;

use thiserror::Error;

use crate::types::StreamKind;

pub mod channel;
pub mod framed_reader;
pub mod retry;
pub mod session;

pub use channel::CommandChannel;
pub use retry::{RetryPolicy, Runner};
pub use session::{ExecutionResult, Session, SessionOptions};

/// Marker echoed after every command on both stdout and stderr.
///
/// Command output that itself ends with this text will be cut short; the
/// framing has no escaping.
pub const FINISH_MESSAGE: &str = "testmd/exec/Session.const.finish";

/// Failures of the command channel itself, as opposed to a command that ran
/// and exited nonzero.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to start shell '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write command to shell stdin: {0}")]
    Write(#[source] std::io::Error),

    #[error("session was cancelled")]
    Cancelled,

    #[error("malformed exit code line '{exit_line}': {source}")]
    Protocol {
        exit_line: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{0} reader stopped before the command finished")]
    Closed(StreamKind),

    #[error("failed waiting for shell to exit: {0}")]
    Wait(#[source] std::io::Error),
}

/// Errors from the retrying driver.
#[derive(Error, Debug)]
pub enum RetryError {
    /// The channel broke; retrying on it would not help.
    #[error(transparent)]
    Channel(#[from] SessionError),

    #[error("command '{command}' still exited with {exit_code} after {attempts} attempt(s)")]
    DeadlineExceeded {
        command: String,
        exit_code: i32,
        attempts: u32,
    },
}
