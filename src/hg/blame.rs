//! Blame extraction over a set of files.
//!
//! Each file gets its own `hg annotate` process: a multi-file invocation
//! reports a single exit status, which would hide which file was at fault.
//! Targets are processed batch by batch; inside a batch at most
//! `max_concurrency` processes run at once.
//!
//! Failure policy:
//! - non-zero exit → that file is `NotBlamable`, the rest carry on
//! - unparseable output → that file is `MalformedOutput`
//! - runner errors (tool missing, timeout, signal) → the whole request fails,
//!   in-flight processes are killed and no partial map is returned
//! - cancellation → `ScmError::Cancelled`, finished results are discarded
//!
//! Results are keyed by `working_dir/path`, so the same relative path under
//! two module directories yields two entries.

use std::pin::pin;
use std::time::Instant;

use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::error::{Result, ScmError};
use crate::hg::context::{EngineConfig, ExecutionContext};
use crate::hg::parser::parse_blame;
use crate::hg::process::Invocation;
use crate::models::{BlameMap, BlameRequest, BlameTarget, FailureKind, FileBlameResult};

/// One record per line: short hash, author email, date with offset, joined by
/// the unit separator. Mercurial expands the escapes itself.
pub const ANNOTATE_TEMPLATE: &str =
    "{lines % '{node|short}\\x1f{user|email}\\x1f{date|isodatesec}\\n'}";

/// Build the annotate command for one file.
pub fn annotate_invocation(config: &EngineConfig, target: &BlameTarget) -> Invocation {
    let mut invocation = Invocation::new(&config.hg_binary, &target.working_dir)
        .arg("annotate")
        .arg("--user")
        .arg("--date")
        .arg("--changeset");

    if config.ignore_whitespace {
        invocation = invocation.arg("--ignore-all-space");
    }

    invocation
        .arg("--template")
        .arg(ANNOTATE_TEMPLATE)
        .arg("--")
        .arg(target.path.as_os_str())
        .env("HGPLAIN", "1")
        .env("HGENCODING", "utf-8")
        .timeout(config.timeout)
}

/// Blame every file of `request`.
///
/// Aborts with `Cancelled` once the context's token is cancelled. That token
/// stays cancelled; use `ExecutionContext::child` per request to cancel one
/// request without affecting later ones.
pub async fn extract_blame(ctx: &ExecutionContext, request: &BlameRequest) -> Result<BlameMap> {
    let cancel = ctx.cancellation_token();

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Blame request cancelled, discarding results");
            Err(ScmError::Cancelled)
        }
        result = run_batches(ctx, request) => result,
    }
}

async fn run_batches(ctx: &ExecutionContext, request: &BlameRequest) -> Result<BlameMap> {
    let targets: Vec<BlameTarget> = request.targets().cloned().collect();
    let batch_len = ctx.config().batch_len();
    let concurrency = ctx.config().concurrency();
    let batch_count = targets.len().div_ceil(batch_len);

    info!(
        "Blaming {} files in {} batch(es), {} concurrent",
        targets.len(),
        batch_count,
        concurrency
    );
    let start = Instant::now();
    let mut results = BlameMap::new();

    for (idx, batch) in targets.chunks(batch_len).enumerate() {
        let mut pending = pin!(
            stream::iter(batch.to_vec())
                .map(|target| async move {
                    let result = blame_file(ctx, &target).await?;
                    Ok::<_, ScmError>((target, result))
                })
                .buffer_unordered(concurrency)
        );

        while let Some(item) = pending.next().await {
            let (target, result) = item?;
            results.insert(target.absolute_path(), result);
        }

        debug!("Batch {}/{} done after {:?}", idx + 1, batch_count, start.elapsed());
    }

    let failed = results.values().filter(|r| !r.is_success()).count();
    info!(
        "Blame finished: {} files, {} failed, in {:?}",
        results.len(),
        failed,
        start.elapsed()
    );

    Ok(results)
}

async fn blame_file(ctx: &ExecutionContext, target: &BlameTarget) -> Result<FileBlameResult> {
    let invocation = annotate_invocation(ctx.config(), target);
    let output = ctx.runner().run(&invocation).await?;

    let Some(code) = output.exit_code else {
        return Err(ScmError::Terminated {
            command: invocation.to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    };

    if code != 0 {
        let message = describe_exit(code, &output.stderr);
        warn!("Cannot blame {}: {}", target.path.display(), message);
        return Ok(FileBlameResult::failure(FailureKind::NotBlamable, message));
    }

    match parse_blame(&output.stdout) {
        Ok(lines) if lines.is_empty() && has_content(target).await => {
            // annotate skips binary files silently unless --text is given
            warn!("No annotation for non-empty file {}", target.path.display());
            Ok(FileBlameResult::failure(
                FailureKind::NotBlamable,
                "hg annotate produced no lines for a non-empty file (binary content?)",
            ))
        }
        Ok(lines) => Ok(FileBlameResult::Success { lines }),
        Err(err) => {
            warn!("Unexpected annotate output for {}: {}", target.path.display(), err);
            Ok(FileBlameResult::failure(FailureKind::MalformedOutput, err.to_string()))
        }
    }
}

fn describe_exit(code: i32, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("hg annotate exited with code {}", code)
    } else {
        format!("hg annotate exited with code {}: {}", code, stderr)
    }
}

async fn has_content(target: &BlameTarget) -> bool {
    tokio::fs::metadata(target.absolute_path())
        .await
        .map(|meta| meta.len() > 0)
        .unwrap_or(false)
}
