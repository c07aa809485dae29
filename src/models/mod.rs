//! Data transfer objects for blame results.
//!
//! These structs are serialized to JSON for the CLI and for host tooling.
//! - `blame`: BlameRequest, BlameTarget, BlameLine, FileBlameResult, BlameMap
//! - `revision`: RevisionId of a working copy

pub mod blame;
pub mod revision;

pub use blame::*;
pub use revision::*;
