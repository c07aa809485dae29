//! Error types for blame extraction.
//!
//! `ScmError` covers request-level failures: anything that means the tool
//! could not be driven at all. Per-file problems are not errors here; they
//! are recorded in the result map as `FailureKind` values.
//!
//! - `ToolUnavailable`, `InvalidWorkingDirectory` → environment problem
//! - `Timeout`, `Terminated` → the process did not finish normally
//! - `Cancelled` → the caller aborted the request

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScmError {
    #[error("Cannot run `{program}`: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Command `{command}` was terminated by a signal: {stderr}")]
    Terminated { command: String, stderr: String },

    #[error("Working directory does not exist: {}", .0.display())]
    InvalidWorkingDirectory(PathBuf),

    #[error("Blame request was cancelled")]
    Cancelled,
}

/// A blame record that does not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed blame record {record}: {reason} in {raw:?}")]
pub struct ParseError {
    /// 1-based position of the record in the output
    pub record: usize,
    pub reason: String,
    pub raw: String,
}

pub type Result<T> = std::result::Result<T, ScmError>;
