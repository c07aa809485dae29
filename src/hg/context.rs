//! Execution context threaded through every operation.
//!
//! Holds the process runner, the engine settings and the cancellation token of
//! the current request. Nothing here is global; tests build a context around a
//! scripted runner.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::hg::process::{ProcessRunner, TokioProcessRunner};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Mercurial executable, looked up on PATH unless absolute
    pub hg_binary: String,
    /// Wall-clock bound for each `hg` process
    pub timeout: Option<Duration>,
    /// Upper bound on `hg` processes alive at once
    pub max_concurrency: usize,
    /// Files handed to the scheduler per orchestration pass
    pub batch_size: usize,
    /// Pass `--ignore-all-space` so reformatting does not steal attribution
    pub ignore_whitespace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hg_binary: "hg".to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            max_concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            batch_size: DEFAULT_BATCH_SIZE,
            ignore_whitespace: true,
        }
    }
}

impl EngineConfig {
    pub(crate) fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    pub(crate) fn batch_len(&self) -> usize {
        self.batch_size.max(1)
    }
}

#[derive(Clone)]
pub struct ExecutionContext {
    runner: Arc<dyn ProcessRunner>,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl ExecutionContext {
    /// Context that spawns real processes.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_runner(Arc::new(TokioProcessRunner), config)
    }

    pub fn with_runner(runner: Arc<dyn ProcessRunner>, config: EngineConfig) -> Self {
        Self {
            runner,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Token whose cancellation aborts requests running on this context.
    ///
    /// Cancellation is permanent: every later request on this context (and on
    /// its clones and children) fails with `Cancelled` straight away.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Context for a single request, sharing runner and config.
    ///
    /// Its token is a child of this one: cancelling the parent cancels it,
    /// cancelling it leaves the parent and its other children usable.
    pub fn child(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            config: self.config.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_are_clamped() {
        let config = EngineConfig {
            max_concurrency: 0,
            batch_size: 0,
            ..EngineConfig::default()
        };

        assert_eq!(config.concurrency(), 1);
        assert_eq!(config.batch_len(), 1);
    }

    #[test]
    fn cloned_contexts_share_cancellation() {
        let ctx = ExecutionContext::default();
        let clone = ctx.clone();

        ctx.cancellation_token().cancel();

        assert!(clone.is_cancelled());
    }

    #[test]
    fn cancelling_a_child_leaves_the_parent_usable() {
        let parent = ExecutionContext::default();
        let first = parent.child();
        let second = parent.child();

        first.cancellation_token().cancel();

        assert!(first.is_cancelled());
        assert!(!parent.is_cancelled());
        assert!(!second.is_cancelled());

        parent.cancellation_token().cancel();
        assert!(second.is_cancelled());
    }
}
