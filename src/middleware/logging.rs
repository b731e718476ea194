//! Start/finish records for every stage, indented by nesting depth.

use super::Middleware;
use crate::error::Result;
use crate::pipeline::{Action, action};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Padding applied to top-level stage records
pub const DEFAULT_INITIAL_PADDING: usize = 3;

/// Extra padding per nesting level
const PADDING_STEP: usize = 2;

/// Logs "starting: <name>" before the stage and "<name> finished in <elapsed>" after it.
///
/// A stage dropped before it returns is logged as "<name> abandoned after <elapsed>".
#[derive(Debug, Clone, Copy)]
pub struct Logging {
    initial_padding: usize,
}

impl Logging {
    /// Logging middleware with a custom base indentation
    pub fn new(initial_padding: usize) -> Self {
        Self { initial_padding }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_PADDING)
    }
}

impl Middleware for Logging {
    fn wrap(&self, name: &str, next: Action) -> Action {
        let name: Arc<str> = Arc::from(name);
        let initial_padding = self.initial_padding;

        action(move |ctx| {
            let name = Arc::clone(&name);
            let next = Arc::clone(&next);
            Box::pin(async move {
                let record = StageRecord::open(name, ctx.nesting(), initial_padding);
                let result = next(&mut *ctx).await;
                record.close(&result);
                result
            })
        })
    }
}

/// Log scope of one running stage.
///
/// Closed exactly once: by [`StageRecord::close`] when the stage returns, or
/// on drop when the stage future is abandoned mid-flight. Either way the
/// nesting depth goes back to what it was when the stage started.
struct StageRecord {
    name: Arc<str>,
    pad: String,
    started: Instant,
    nesting: Arc<AtomicUsize>,
    depth: usize,
    closed: bool,
}

impl StageRecord {
    fn open(name: Arc<str>, nesting: Arc<AtomicUsize>, initial_padding: usize) -> Self {
        let depth = nesting.fetch_add(1, Ordering::Relaxed);
        let pad = " ".repeat(initial_padding + depth * PADDING_STEP);
        log::info!("{pad}starting: {name}");
        Self {
            name,
            pad,
            started: Instant::now(),
            nesting,
            depth,
            closed: false,
        }
    }

    fn close(mut self, result: &Result<()>) {
        let took = self.started.elapsed();
        let (pad, name) = (&self.pad, &self.name);
        match result {
            Ok(()) => log::info!("{pad}{name} finished in {took:.2?}"),
            Err(_) => log::error!("{pad}{name} failed after {took:.2?}"),
        }
        self.closed = true;
    }
}

impl Drop for StageRecord {
    fn drop(&mut self) {
        self.nesting.store(self.depth, Ordering::Relaxed);
        if !self.closed {
            let took = self.started.elapsed();
            log::warn!("{}{} abandoned after {took:.2?}", self.pad, self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Project;
    use crate::context::Context;
    use crate::pipeline::{Pipeline, Stage};
    use std::time::Duration;

    fn stuck(name: &str) -> Stage {
        Stage::new(name, |_ctx| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn test_depth_restored_after_stage_returns() {
        let mut ctx = Context::new(Project::default());
        let inner = Pipeline::new(vec![Stage::new("leaf", |ctx| {
            Box::pin(async move {
                assert_eq!(ctx.depth(), 2);
                Ok(())
            })
        })]);
        let outer = Pipeline::new(vec![inner.into_stage("group")]);

        outer.run(&mut ctx).await.expect("nested run succeeds");
        assert_eq!(ctx.depth(), 0);
    }

    #[tokio::test]
    async fn test_depth_restored_when_stage_is_abandoned() {
        let mut ctx = Context::new(Project::default());
        let inner = Pipeline::new(vec![stuck("forever")]);
        let outer = Pipeline::new(vec![inner.into_stage("group")]);

        let timed_out = tokio::time::timeout(Duration::from_millis(20), outer.run(&mut ctx)).await;
        assert!(timed_out.is_err());
        assert_eq!(ctx.depth(), 0);
    }
}
