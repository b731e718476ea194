//! Bounded-concurrency task group for work inside a single stage.

use crate::context::{Cancellation, Context};
use crate::error::{ReleaseError, Result};
use crate::middleware::panic_message;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs at most `limit` tasks at once and reports the first error.
///
/// Every task is awaited before `wait` returns, even after a failure, so a
/// stage never leaves workers running behind the next stage.
pub struct Group {
    permits: Arc<Semaphore>,
    tasks: JoinSet<Result<()>>,
    cancellation: Cancellation,
}

impl Group {
    /// Group limited by the context's parallelism hint
    pub fn new(ctx: &Context) -> Self {
        Self::with_limit(ctx.parallelism(), ctx.cancellation().clone())
    }

    /// Group with an explicit limit; zero is treated as one
    pub fn with_limit(limit: usize, cancellation: Cancellation) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
            tasks: JoinSet::new(),
            cancellation,
        }
    }

    /// Queue a task. It starts once a permit is free and stops early on cancellation.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let cancellation = self.cancellation.clone();
        self.tasks.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(cancellation.error()),
                permit = permits.acquire_owned() => permit.map_err(anyhow::Error::from)?,
            };
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(cancellation.error()),
                result = task => result,
            }
        });
    }

    /// Number of queued or running tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are queued
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task and return the first error
    pub async fn wait(mut self) -> Result<()> {
        let mut first_error: Option<ReleaseError> = None;
        while let Some(joined) = self.tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => Err(anyhow::anyhow!(
                    "worker panicked: {}",
                    panic_message(join_error.into_panic().as_ref())
                )
                .into()),
                Err(join_error) => Err(anyhow::Error::from(join_error).into()),
            };
            if let Err(err) = result {
                log::debug!("group task failed: {err}");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
