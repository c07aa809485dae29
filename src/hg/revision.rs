use std::path::Path;

use tracing::debug;

use crate::hg::context::ExecutionContext;
use crate::hg::process::Invocation;
use crate::models::RevisionId;

pub fn id_invocation(ctx: &ExecutionContext, working_dir: &Path) -> Invocation {
    Invocation::new(&ctx.config().hg_binary, working_dir)
        .arg("id")
        .arg("-i")
        .env("HGPLAIN", "1")
        .timeout(ctx.config().timeout)
}

/// Short id of the working copy's parent, `None` when it cannot be determined.
///
/// Missing SCM metadata is reported, never fatal: every failure is logged and
/// mapped to `None`.
pub async fn current_revision(ctx: &ExecutionContext, working_dir: &Path) -> Option<RevisionId> {
    let invocation = id_invocation(ctx, working_dir);

    let output = match ctx.runner().run(&invocation).await {
        Ok(output) => output,
        Err(e) => {
            debug!("The mercurial id command [{}] could not run: {}", invocation, e);
            return None;
        }
    };

    if !output.success() {
        debug!(
            "The mercurial id command [{}] failed: {}",
            invocation,
            output.stderr.trim()
        );
        return None;
    }

    let id = output.stdout.trim();
    if id.is_empty() {
        debug!("The mercurial id command [{}] printed nothing", invocation);
        return None;
    }

    Some(RevisionId::new(id))
}
