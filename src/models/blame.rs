//! Blame data transfer objects.
//!
//! Provides per-line author attribution for files in a Mercurial working copy.
//! A request names the files; the answer maps each file to either its lines or
//! a classified failure, so an unblamable file is never silently missing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Blame information for a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    /// Line number (1-indexed)
    pub line_number: u32,
    /// Short changeset hash of the revision that last modified this line
    pub revision: String,
    /// Author of that revision, empty when unknown
    pub author: String,
    /// When that revision was committed, in the committer's offset
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Mercurial refused to annotate the file (untracked, removed, binary...)
    NotBlamable,
    /// Mercurial answered, but not in the shape we asked for
    MalformedOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of blaming one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileBlameResult {
    Success { lines: Vec<BlameLine> },
    Failure(BlameFailure),
}

impl FileBlameResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        FileBlameResult::Failure(BlameFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileBlameResult::Success { .. })
    }

    pub fn lines(&self) -> Option<&[BlameLine]> {
        match self {
            FileBlameResult::Success { lines } => Some(lines),
            FileBlameResult::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            FileBlameResult::Success { .. } => None,
            FileBlameResult::Failure(failure) => Some(failure.kind),
        }
    }
}

/// One file to blame: a path relative to the working directory it is run in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlameTarget {
    pub working_dir: PathBuf,
    pub path: PathBuf,
}

impl BlameTarget {
    pub fn new(working_dir: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            path: path.into(),
        }
    }

    /// Location of the file on disk.
    pub fn absolute_path(&self) -> PathBuf {
        self.working_dir.join(&self.path)
    }
}

/// Files of one checkout submitted together.
///
/// Targets are kept sorted and deduplicated, which makes batching (and so the
/// order processes are started in) independent of insertion order.
#[derive(Debug, Clone, Default)]
pub struct BlameRequest {
    targets: BTreeSet<BlameTarget>,
}

impl BlameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request blame for `paths`, all relative to `working_dir`.
    pub fn for_files<I, P>(working_dir: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut request = Self::new();
        for path in paths {
            request.add(BlameTarget::new(working_dir, path));
        }
        request
    }

    pub fn add(&mut self, target: BlameTarget) {
        self.targets.insert(target);
    }

    pub fn with_target(mut self, target: BlameTarget) -> Self {
        self.add(target);
        self
    }

    pub fn targets(&self) -> impl Iterator<Item = &BlameTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Per-file outcomes keyed by `BlameTarget::absolute_path`, so targets that
/// share a relative path under different working directories stay distinct.
pub type BlameMap = BTreeMap<PathBuf, FileBlameResult>;
