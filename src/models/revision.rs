use std::fmt;

use serde::Serialize;

/// Identifier of the working copy's current state, as printed by `hg id -i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mercurial appends `+` when the working copy has uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.0.ends_with('+')
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
