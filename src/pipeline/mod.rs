//! Ordered stage pipeline and its driver.
//!
//! Stages run strictly in registration order, one at a time, each through
//! the middleware chain the pipeline was built with. The first failure or
//! cancellation stops the run; later stages are never started.

mod group;
mod stage;

pub use group::Group;
pub use stage::{Action, Stage, action};

use crate::context::Context;
use crate::error::{ReleaseError, Result};
use crate::middleware::Chain;

/// Report that a stage intentionally did nothing.
///
/// The error-handling middleware logs the reason and treats the stage as successful.
pub fn skip(reason: impl Into<String>) -> ReleaseError {
    ReleaseError::Skipped {
        reason: reason.into(),
    }
}

/// Stage list with middleware applied at build time
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<(String, Action)>,
}

impl Pipeline {
    /// Build a pipeline with the default middleware chain
    pub fn new(stages: Vec<Stage>) -> Self {
        Self::with_chain(stages, &Chain::default())
    }

    /// Build a pipeline wrapping each stage with `chain`
    pub fn with_chain(stages: Vec<Stage>, chain: &Chain) -> Self {
        let stages = stages
            .iter()
            .map(|stage| (stage.name().to_string(), chain.wrap(stage)))
            .collect();
        Self { stages }
    }

    /// Stage names in execution order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|(name, _)| name.as_str())
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order against `ctx`.
    ///
    /// Returns the first stage error, or a cancellation error if the context
    /// was cancelled before, during or right after a stage.
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        for (name, stage) in &self.stages {
            if ctx.is_cancelled() {
                log::debug!("not starting {name}: run cancelled");
                return Err(ctx.cancellation().error());
            }

            let result = stage(&mut *ctx).await;

            if ctx.is_cancelled() {
                if let Err(err) = &result {
                    log::debug!("{name} returned after cancellation: {err}");
                }
                return Err(ctx.cancellation().error());
            }
            result?;
        }
        Ok(())
    }

    /// Turn this pipeline into a single stage of an outer pipeline.
    ///
    /// Inner stages log one level deeper than the group itself.
    pub fn into_stage(self, name: impl Into<String>) -> Stage {
        Stage::new(name, move |ctx| {
            let pipeline = self.clone();
            Box::pin(async move { pipeline.run(ctx).await })
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
