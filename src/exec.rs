//! Privileged command execution
//!
//! [`SudoCommandRunner`] is the concrete raw-output source: it spawns the
//! requested utility (optionally under sudo), captures stdout/stderr, and
//! enforces the per-call timeout. The privileged-execution policy is
//! injected here at construction; no module-global configuration exists.

use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Render a command line for logs and error messages
fn display_command(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Command runner that executes utilities with elevated privilege
pub struct SudoCommandRunner {
    use_sudo: bool,
}

impl SudoCommandRunner {
    pub fn new(use_sudo: bool) -> Self {
        Self { use_sudo }
    }
}

#[async_trait]
impl CommandRunner for SudoCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let shown = display_command(program, args);
        debug!(command = %shown, timeout_secs = timeout.as_secs(), "executing");

        let mut cmd = if self.use_sudo {
            let mut c = Command::new("sudo");
            c.arg("-n").arg(program);
            c
        } else {
            Command::new(program)
        };

        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Guarantees the child is reaped if this future is dropped
            // on caller cancellation or timeout.
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| Error::ExecFailed {
            command: shown.clone(),
            reason: e.to_string(),
        })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            }),
            Ok(Err(e)) => Err(Error::ExecFailed {
                command: shown,
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::CommandTimedOut {
                command: shown,
                timeout,
            }),
        }
    }
}

// =============================================================================
// Test Double
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted runner for tests: maps a rendered command line to a canned
    /// response, records every invocation, and can hold each call open for
    /// a fixed latency to exercise concurrency paths.
    pub struct ScriptedRunner {
        responses: HashMap<String, Result<CommandOutput>>,
        pub calls: Mutex<Vec<String>>,
        latency: Option<Duration>,
        fallback_ok: bool,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                latency: None,
                fallback_ok: false,
            }
        }

        /// Unscripted commands succeed with empty output instead of failing
        pub fn with_fallback_ok(mut self) -> Self {
            self.fallback_ok = true;
            self
        }

        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        pub fn on(mut self, command: &str, stdout: &str) -> Self {
            self.responses.insert(
                command.to_string(),
                Ok(CommandOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                }),
            );
            self
        }

        pub fn on_failing(mut self, command: &str, stderr: &str, exit_code: i32) -> Self {
            self.responses.insert(
                command.to_string(),
                Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    exit_code: Some(exit_code),
                }),
            );
            self
        }

        pub fn on_error(mut self, command: &str, error: Error) -> Self {
            self.responses.insert(command.to_string(), Err(error));
            self
        }

        pub fn call_count(&self, command: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.as_str() == command)
                .count()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            _timeout: Duration,
        ) -> Result<CommandOutput> {
            let shown = display_command(program, args);
            self.calls.lock().unwrap().push(shown.clone());

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            match self.responses.get(&shown) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(e)) => Err(match e {
                    Error::CommandTimedOut { command, timeout } => Error::CommandTimedOut {
                        command: command.clone(),
                        timeout: *timeout,
                    },
                    Error::ExecFailed { command, reason } => Error::ExecFailed {
                        command: command.clone(),
                        reason: reason.clone(),
                    },
                    other => Error::Internal(other.to_string()),
                }),
                None if self.fallback_ok => Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: Some(0),
                }),
                None => Err(Error::ExecFailed {
                    command: shown,
                    reason: "unscripted command".into(),
                }),
            }
        }
    }
}
