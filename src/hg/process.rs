//! External process execution.
//!
//! `ProcessRunner` is the only place the crate touches the OS process table.
//! The engine talks to it through the trait so tests can script answers
//! instead of spawning `hg`.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, ScmError};

/// A fully described command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub envs: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            envs: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run one process to completion. A non-zero exit code is not an error.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runs commands with `tokio::process`.
///
/// The child is spawned with `kill_on_drop`, so dropping the returned future
/// (timeout, cancellation, a sibling's fatal error) kills the process and
/// leaves reaping to the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        if !invocation.working_dir.is_dir() {
            return Err(ScmError::InvalidWorkingDirectory(invocation.working_dir.clone()));
        }

        debug!("Executing: {} (in {})", invocation, invocation.working_dir.display());
        let start = Instant::now();

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ScmError::ToolUnavailable {
                program: invocation.program.clone(),
                source,
            })?;

        // wait_with_output drains both pipes concurrently with the wait
        let wait = child.wait_with_output();
        let output = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(output) => output,
                Err(_) => {
                    return Err(ScmError::Timeout {
                        command: invocation.to_string(),
                        timeout: limit,
                    });
                }
            },
            None => wait.await,
        }
        .map_err(|source| ScmError::ToolUnavailable {
            program: invocation.program.clone(),
            source,
        })?;

        let exit_code = output.status.code();
        debug!(
            "Command finished in {:?} with exit code {:?}",
            start.elapsed(),
            exit_code
        );

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
