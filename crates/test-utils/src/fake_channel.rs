use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use testmd::exec::{CommandChannel, ExecutionResult, SessionError};

/// A command channel that:
/// - records every command it is asked to run
/// - replays scripted outcomes in order, then keeps answering with the
///   fallback (exit 0 unless changed).
#[derive(Clone)]
pub struct ScriptedChannel {
    outcomes: Arc<Mutex<VecDeque<Result<ExecutionResult, SessionError>>>>,
    fallback_exit: i32,
    executed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            fallback_exit: 0,
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a result with the given exit code and output.
    pub fn then_exit(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(ExecutionResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: code,
        }));
        self
    }

    /// Queue a channel failure.
    pub fn then_fail(self, err: SessionError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(err));
        self
    }

    /// Exit code used once the script is exhausted.
    pub fn otherwise_exit(mut self, code: i32) -> Self {
        self.fallback_exit = code;
        self
    }

    /// Shared handle to the list of executed commands.
    pub fn executed(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }

    pub fn executed_commands(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel for ScriptedChannel {
    fn execute<'a>(
        &'a mut self,
        command: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, SessionError>> + Send + 'a>> {
        self.executed.lock().unwrap().push(command.to_string());

        let next = self.outcomes.lock().unwrap().pop_front();
        let outcome = next.unwrap_or(Ok(ExecutionResult {
            exit_code: self.fallback_exit,
            ..Default::default()
        }));

        Box::pin(async move { outcome })
    }
}
