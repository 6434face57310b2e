#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs an untrusted submission in a throwaway directory under a hard
//! wall-clock limit.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::EvalConfig,
    process::{self, ProcessError},
    record::ExecutionOutcome,
};

/// Something that can run submission source and report how it went.
///
/// A runner never fails: launch problems, timeouts and crashes all come back
/// as [`ExecutionOutcome::Failed`].
#[async_trait]
pub trait SourceRunner: Send + Sync {
    /// Runs `source` once and reports the outcome.
    async fn run(&self, source: &str) -> ExecutionOutcome;
}

/// Runs submissions with a real Python interpreter.
#[derive(Debug, Clone)]
pub struct IsolatedExecutor {
    /// Interpreter used to run the script.
    interpreter: PathBuf,
    /// Wall-clock limit for one run.
    timeout:     Duration,
}

impl IsolatedExecutor {
    /// Creates an executor with an explicit interpreter and limit.
    pub fn new(interpreter: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    /// Creates an executor from configuration, locating the interpreter on
    /// `PATH` unless one is configured.
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        let interpreter = match config.interpreter() {
            Some(path) => path.to_path_buf(),
            None => locate_interpreter()?,
        };
        Ok(Self::new(interpreter, config.execution_timeout()))
    }

    /// Interpreter in use.
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Wall-clock limit for one run.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Writes the script into `dir` and runs it there.
    async fn run_in(&self, dir: &Path, source: &str) -> ExecutionOutcome {
        let script = dir.join(format!("submission_{}.py", Uuid::new_v4().simple()));
        if let Err(e) = tokio::fs::write(&script, source).await {
            return ExecutionOutcome::failed("", format!("Could not stage submission: {e}"));
        }

        debug!(script = %script.display(), "running submission");
        let args = [OsString::from(script.as_os_str())];
        match process::run_collect(&self.interpreter, &args, Some(dir), Some(self.timeout)).await {
            Ok(collected) if collected.status.success() => {
                ExecutionOutcome::succeeded(collected.stdout_lossy())
            }
            Ok(collected) => {
                ExecutionOutcome::failed(collected.stdout_lossy(), collected.stderr_lossy())
            }
            Err(ProcessError::TimedOut(limit)) => ExecutionOutcome::failed(
                "",
                format!("Timeout: code execution timed out after {} seconds", limit.as_secs()),
            ),
            Err(e) => ExecutionOutcome::failed("", e.to_string()),
        }
    }
}

#[async_trait]
impl SourceRunner for IsolatedExecutor {
    async fn run(&self, source: &str) -> ExecutionOutcome {
        let dir = match tempfile::Builder::new().prefix("gradeflow-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return ExecutionOutcome::failed("", format!("Could not create sandbox: {e}"));
            }
        };

        let outcome = self.run_in(dir.path(), source).await;

        // Dropping the TempDir would also clean up; closing surfaces the error.
        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            warn!(dir = %path.display(), error = %e, "could not remove sandbox directory");
        }

        outcome
    }
}

/// Finds `python3` or `python` on `PATH`.
pub fn locate_interpreter() -> Result<PathBuf> {
    which::which("python3")
        .or_else(|_| which::which("python"))
        .context("Could not find python3 or python on PATH; set GRADEFLOW_PYTHON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_interpreter_is_a_failed_outcome() {
        let executor = IsolatedExecutor::new(
            "/definitely/not/an/interpreter/python9",
            Duration::from_secs(5),
        );
        let outcome = executor.run("print('hi')\n").await;

        assert!(!outcome.is_success());
        assert!(
            outcome
                .error()
                .is_some_and(|e| e.contains("failed to spawn")),
            "{outcome:?}"
        );
    }
}
