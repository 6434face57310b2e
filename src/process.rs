#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, BufReader},
    process::{Child, Command},
    time::timeout,
};

/// Why a subprocess could not be collected.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying OS error.
        source:  std::io::Error,
    },
    /// Reading a pipe or waiting on the child failed.
    #[error("failed to {action}: {source}")]
    Io {
        /// What was being done.
        action: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },
    /// A pipe was not available on the spawned child.
    #[error("missing {0} pipe")]
    MissingPipe(&'static str),
    /// A reader task panicked or was cancelled.
    #[error("{0} reader task failed")]
    Join(&'static str),
    /// The deadline passed before the child exited; the child is killed.
    #[error("process did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Kills the wrapped child when dropped unless disarmed. Dropping the wait
/// future on timeout goes through here.
struct ChildDropGuard(Option<Child>);

impl ChildDropGuard {
    /// Wraps the provided child process with the drop guard.
    fn new(child: Child) -> Self {
        Self(Some(child))
    }

    /// Returns a mutable reference to the underlying child process.
    fn child_mut(&mut self) -> Result<&mut Child, ProcessError> {
        self.0.as_mut().ok_or(ProcessError::MissingPipe("child"))
    }

    /// Prevents the guard from killing the process on drop.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for ChildDropGuard {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct Collected {
    /// Exit status returned by the process.
    pub status: std::process::ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

impl Collected {
    /// Stdout decoded lossily as UTF-8.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded lossily as UTF-8.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Reads a pipe to the end on its own task.
fn drain<R>(pipe: R, name: &'static str) -> tokio::task::JoinHandle<Result<Vec<u8>, ProcessError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|source| ProcessError::Io {
                action: if name == "stdout" { "read stdout" } else { "read stderr" },
                source,
            })?;
        Ok::<Vec<u8>, ProcessError>(buf)
    })
}

/// Spawns a command with stdin closed and collects stdout/stderr.
///
/// With a `deadline`, the child is killed and [`ProcessError::TimedOut`] is
/// returned if it has not exited in time; partial output is discarded.
pub async fn run_collect(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    cwd: Option<&Path>,
    deadline: Option<Duration>,
) -> Result<Collected, ProcessError> {
    let program = program.as_ref();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    let mut guard = ChildDropGuard::new(child);

    let stdout = guard
        .child_mut()?
        .stdout
        .take()
        .ok_or(ProcessError::MissingPipe("stdout"))?;
    let stderr = guard
        .child_mut()?
        .stderr
        .take()
        .ok_or(ProcessError::MissingPipe("stderr"))?;

    let out_task = drain(stdout, "stdout");
    let err_task = drain(stderr, "stderr");

    let wait_future = async move {
        let mut guard = guard;
        let status = guard
            .child_mut()?
            .wait()
            .await
            .map_err(|source| ProcessError::Io {
                action: "wait on process",
                source,
            })?;
        let stdout = out_task.await.map_err(|_| ProcessError::Join("stdout"))??;
        let stderr = err_task.await.map_err(|_| ProcessError::Join("stderr"))??;
        guard.disarm();
        Ok::<Collected, ProcessError>(Collected {
            status,
            stdout,
            stderr,
        })
    };

    match deadline {
        Some(limit) => timeout(limit, wait_future)
            .await
            .map_err(|_| ProcessError::TimedOut(limit))?,
        None => wait_future.await,
    }
}
