//! SCM provider capability set exposed to host tooling.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::hg::blame::extract_blame;
use crate::hg::context::ExecutionContext;
use crate::hg::revision::current_revision;
use crate::models::{BlameMap, BlameRequest, RevisionId};

/// Marker directory at the root of a Mercurial checkout.
pub const HG_MARKER: &str = ".hg";

#[async_trait]
pub trait ScmProvider: Send + Sync {
    /// Key the provider is registered under (e.g. "hg")
    fn key(&self) -> &'static str;

    /// Whether `base_dir` is the root of a checkout this provider handles
    fn supports(&self, base_dir: &Path) -> bool;

    async fn blame(&self, request: &BlameRequest) -> Result<BlameMap>;

    async fn revision_id(&self, working_dir: &Path) -> Option<RevisionId>;
}

#[derive(Clone, Default)]
pub struct MercurialProvider {
    ctx: ExecutionContext,
}

impl MercurialProvider {
    pub fn new(ctx: ExecutionContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }
}

#[async_trait]
impl ScmProvider for MercurialProvider {
    fn key(&self) -> &'static str {
        "hg"
    }

    fn supports(&self, base_dir: &Path) -> bool {
        base_dir.join(HG_MARKER).exists()
    }

    async fn blame(&self, request: &BlameRequest) -> Result<BlameMap> {
        extract_blame(&self.ctx, request).await
    }

    async fn revision_id(&self, working_dir: &Path) -> Option<RevisionId> {
        current_revision(&self.ctx, working_dir).await
    }
}
