//! Release driver: builds the run context, supervises the pipeline and
//! reports the outcome with elapsed time.

use crate::config::{Project, ReleaseOptions, load_config};
use crate::context::{Artifact, Context};
use crate::error::{ReleaseError, Result};
use crate::pipeline::Pipeline;
use crate::supervisor::Supervisor;
use std::time::{Duration, Instant};

/// Outcome of a successful release
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Deprecated settings were used; warn the operator
    pub deprecated: bool,
    /// Artifacts recorded by stages
    pub artifacts: Vec<Artifact>,
    /// Release notes assembled by stages
    pub release_notes: Option<String>,
}

/// Run `pipeline` for an already loaded project.
///
/// Errors come back wrapped in the top-level envelope with the elapsed time
/// since the context was created.
pub async fn release(
    project: Project,
    options: &ReleaseOptions,
    pipeline: &Pipeline,
    supervisor: Supervisor,
) -> Result<ReleaseReport> {
    let (mut ctx, _guard) = Context::with_timeout(project, options.timeout);
    ctx.apply_options(options);

    let cancellation = ctx.cancellation().clone();
    let outcome = supervisor.run(&cancellation, pipeline.run(&mut ctx)).await;
    let elapsed = ctx.elapsed();

    match outcome {
        Ok(()) => Ok(ReleaseReport {
            elapsed,
            deprecated: ctx.deprecated(),
            artifacts: std::mem::take(&mut ctx.artifacts),
            release_notes: ctx.release_notes.take(),
        }),
        Err(err) => Err(ReleaseError::after(elapsed, err)),
    }
}

/// Load the configuration named by `options` and run `pipeline` against it.
///
/// A configuration error is reported before any stage runs, in the same envelope.
pub async fn release_project(
    options: &ReleaseOptions,
    pipeline: &Pipeline,
    supervisor: Supervisor,
) -> Result<ReleaseReport> {
    let started = Instant::now();
    let project = load_config(options.config.as_deref())
        .map_err(|err| ReleaseError::after(started.elapsed(), err))?;
    release(project, options, pipeline, supervisor).await
}
