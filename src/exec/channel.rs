// src/exec/channel.rs

//! The seam between the retry driver and whatever actually runs commands.
//!
//! Production code uses [`Session`]; tests can provide a scripted channel
//! that replays canned results without spawning a shell.

use std::future::Future;
use std::pin::Pin;

use super::SessionError;
use super::session::{ExecutionResult, Session};

/// Something that can run one command at a time and report its outcome.
pub trait CommandChannel: Send {
    fn execute<'a>(
        &'a mut self,
        command: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, SessionError>> + Send + 'a>>;
}

impl CommandChannel for Session {
    fn execute<'a>(
        &'a mut self,
        command: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, SessionError>> + Send + 'a>> {
        Box::pin(self.run(command))
    }
}
