//! Per-line blame extraction for Mercurial working copies.
//!
//! - `hg::blame`: run `hg annotate` over many files with bounded concurrency
//! - `hg::parser`: turn templated annotate output into `BlameLine`s
//! - `hg::process`: spawn, time out and reap external processes
//! - `hg::revision`: working copy revision id (`hg id -i`)
//! - `hg::provider`: `ScmProvider` capability set for host tooling

pub mod error;
pub mod hg;
pub mod models;

pub use error::{ParseError, Result, ScmError};
pub use hg::{EngineConfig, ExecutionContext, MercurialProvider, ScmProvider, extract_blame, current_revision};
pub use models::{BlameFailure, BlameLine, BlameMap, BlameRequest, BlameTarget, FailureKind, FileBlameResult, RevisionId};
