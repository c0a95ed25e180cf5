// SPDX-License-Identifier: MIT

//! Runtime driver: invokes the OCI runtime binary with an argument
//! vector and captures stdout/stderr/exit code.
//!
//! Grounded directly on the teacher's `run_docker` helper
//! (`daemon/src/adapters/agent/docker/mod.rs`): spawn, wait, capture
//! stdout/stderr. Generalized from a hardcoded `"docker"` binary into the
//! configured `runtime_binary`, and exposed through a trait (grounded on
//! the teacher's `AgentAdapter` trait seam,
//! `daemon/src/adapters/agent/mod.rs`) so the lifecycle manager and hooks
//! can be tested against a [`FakeDriver`] instead of a real container
//! runtime.
//!
//! Unlike the teacher's helper, a nonzero exit is not itself an error
//! here: ripgrep's "no match" exit code (1) is a legitimate outcome the
//! post hook must distinguish from a genuine failure, so [`run`] only
//! fails when the subprocess could not be spawned at all; callers inspect
//! [`DriverOutput::status`] themselves. `stdout` is captured verbatim,
//! untrimmed: the post hook hands it straight to the agent as
//! `output.output` for read/list/grep/glob (spec §8), so trimming here
//! would silently drop real file/listing bytes. Callers that want a
//! single parsed token — `inspect`'s `true`/`false`, `ps`'s table — trim
//! at their own call site.

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

/// Captured result of a runtime subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl DriverOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to execute {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

/// Invokes the OCI runtime binary with an argument vector.
#[async_trait::async_trait]
pub trait RuntimeDriver: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<DriverOutput, DriverError>;
}

/// Production driver: spawns `binary` as a child process via
/// `tokio::process::Command`.
pub struct SubprocessDriver {
    binary: String,
}

impl SubprocessDriver {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

#[async_trait::async_trait]
impl RuntimeDriver for SubprocessDriver {
    async fn run(&self, args: &[String]) -> Result<DriverOutput, DriverError> {
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|source| DriverError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        Ok(DriverOutput {
            // Not trimmed: for read/list/grep/glob this is the exact
            // passthrough the agent's `output.output` must equal byte for
            // byte (spec §8). Callers that only want a single parsed
            // token — `inspect`'s `true`/`false`, `ps`'s table — trim at
            // their own call site instead.
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}

/// Test double: a scripted queue of canned responses, returned in order
/// regardless of the args passed (tests assert on args separately via
/// [`FakeDriver::calls`] when they need to).
pub struct FakeDriver {
    responses: Mutex<VecDeque<Result<DriverOutput, DriverError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_success(&self, stdout: impl Into<String>) -> &Self {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(Ok(DriverOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            status: 0,
        }));
        self
    }

    pub fn push_output(&self, stdout: impl Into<String>, stderr: impl Into<String>, status: i32) -> &Self {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(Ok(DriverOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            status,
        }));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RuntimeDriver for FakeDriver {
    async fn run(&self, args: &[String]) -> Result<DriverOutput, DriverError> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(args.to_vec());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(DriverOutput {
                stdout: String::new(),
                stderr: "FakeDriver: no scripted response".to_string(),
                status: 1,
            }))
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
