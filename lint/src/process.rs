//! Process runner: one external invocation per call.
//!
//! [`SystemRunner`] spawns with `kill_on_drop(true)`: dropping the future
//! returned by [`ProcessRunner::run`] kills the child, so a cancelled lint run
//! never outlives the pipeline that started it and never reports back.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;

use crate::types::OutputStream;

/// Process run future type alias.
pub type RunFut<'a> = Pin<Box<dyn Future<Output = Result<ProcessOutput, ProcessError>> + Send + 'a>>;

/// Executable plus ordered arguments and an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured output of a process that exited with status zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub fn stream(&self, stream: OutputStream) -> &str {
        match stream {
            OutputStream::Stdout => &self.stdout,
            OutputStream::Stderr => &self.stderr,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {}: {}", describe_status(.status), .stderr.trim())]
    Failed {
        program: String,
        /// Exit code, `None` when the process was terminated by a signal.
        status: Option<i32>,
        stderr: String,
    },
}

impl ProcessError {
    /// Standard error captured before the failure, if the process ran at all.
    #[must_use]
    pub fn stderr(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { stderr, .. } => stderr,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Spawn { .. } => None,
            Self::Failed { status, .. } => *status,
        }
    }
}

#[allow(clippy::ref_option)] // called with a field reference from the error derive
fn describe_status(status: &Option<i32>) -> String {
    match *status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Runs an external command to completion.
///
/// Implementations must not retry, and must release the child when the
/// returned future is dropped.
pub trait ProcessRunner: Send + Sync {
    fn run<'a>(&'a self, command: &'a CommandLine) -> RunFut<'a>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run<'a>(&'a self, command: &'a CommandLine) -> RunFut<'a> {
        Box::pin(run_command(command))
    }
}

async fn run_command(command: &CommandLine) -> Result<ProcessOutput, ProcessError> {
    let program = command.program().display().to_string();
    let mut cmd = Command::new(command.program());
    cmd.args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = command.cwd() {
        cmd.current_dir(cwd);
    }

    tracing::debug!(command = %command, "Spawning process");
    let output = cmd.output().await.map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        return Err(ProcessError::Failed {
            program,
            status: output.status.code(),
            stderr,
        });
    }
    Ok(ProcessOutput { stdout, stderr })
}
