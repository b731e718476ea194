//! Run-scoped state threaded through every stage of a release.
//!
//! A [`Context`] is created once per invocation, configured before the first
//! stage starts, handed to each stage in order and dropped when the run ends.
//! The [`ContextGuard`] returned alongside it stops the deadline timer and
//! cancels the run on every exit path.

mod artifact;
mod cancel;

pub use artifact::{Artifact, ArtifactKind};
pub use cancel::{CancelReason, Cancellation};

use crate::config::{Project, ReleaseOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Run mode flags, always stored in resolved form on the context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Unversioned dry run
    pub snapshot: bool,
    /// Do not publish anything
    pub skip_publish: bool,
    /// Do not run sanity checks
    pub skip_validate: bool,
    /// Do not sign artifacts
    pub skip_sign: bool,
    /// Remove the dist directory before the run
    pub remove_dist: bool,
}

impl RunFlags {
    /// Apply mode invariants to the requested flags.
    ///
    /// Snapshot forces publish and validation off. Signing is left as requested.
    pub fn resolve(self) -> Self {
        Self {
            snapshot: self.snapshot,
            skip_publish: self.skip_publish || self.snapshot,
            skip_validate: self.skip_validate || self.snapshot,
            skip_sign: self.skip_sign,
            remove_dist: self.remove_dist,
        }
    }
}

/// Operator-supplied release notes files
#[derive(Debug, Clone, Default)]
pub struct ReleaseNotesFiles {
    /// Replaces generated notes
    pub notes: Option<PathBuf>,
    /// Prepended to the notes
    pub header: Option<PathBuf>,
    /// Appended to the notes
    pub footer: Option<PathBuf>,
}

/// Shared state for a single release run
#[derive(Debug)]
pub struct Context {
    config: Arc<Project>,
    parallelism: usize,
    flags: RunFlags,
    notes_files: ReleaseNotesFiles,
    deprecated: bool,
    cancellation: Cancellation,
    started_at: Instant,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    depth: Arc<AtomicUsize>,
    /// Release notes assembled by a stage
    pub release_notes: Option<String>,
    /// Files produced by stages so far
    pub artifacts: Vec<Artifact>,
}

/// Releases a context's background timer. Dropping it cancels the run.
#[must_use = "dropping the guard cancels the run"]
#[derive(Debug)]
pub struct ContextGuard {
    timer: Option<JoinHandle<()>>,
    cancellation: Cancellation,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.cancellation.release();
    }
}

impl Context {
    /// Create a context without a deadline
    pub fn new(config: Project) -> Self {
        Self {
            config: Arc::new(config),
            parallelism: crate::config::DEFAULT_PARALLELISM,
            flags: RunFlags::default(),
            notes_files: ReleaseNotesFiles::default(),
            deprecated: false,
            cancellation: Cancellation::new(),
            started_at: Instant::now(),
            timeout: None,
            deadline: None,
            depth: Arc::new(AtomicUsize::new(0)),
            release_notes: None,
            artifacts: Vec::new(),
        }
    }

    /// Create a context that cancels itself once `timeout` elapses.
    ///
    /// Must be called from within a tokio runtime: the deadline timer is a
    /// spawned task, stopped when the returned guard is dropped.
    pub fn with_timeout(config: Project, timeout: Duration) -> (Self, ContextGuard) {
        let mut ctx = Self::new(config);
        ctx.timeout = Some(timeout);

        if timeout.is_zero() {
            ctx.cancellation
                .cancel(CancelReason::DeadlineExceeded { timeout });
        }

        // A timeout past the clock's range never fires
        let timer = match ctx.started_at.checked_add(timeout) {
            Some(deadline) => {
                ctx.deadline = Some(deadline);
                let cancellation = ctx.cancellation.clone();
                Some(tokio::spawn(async move {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline.into()) => {
                            cancellation.cancel(CancelReason::DeadlineExceeded { timeout });
                        }
                        _ = cancellation.cancelled() => {}
                    }
                }))
            }
            None => {
                log::debug!("timeout of {timeout:?} is out of range, running without a deadline");
                None
            }
        };

        let guard = ContextGuard {
            timer,
            cancellation: ctx.cancellation.clone(),
        };
        (ctx, guard)
    }

    /// Copy operator options into the context, resolving mode invariants.
    pub fn apply_options(&mut self, options: &ReleaseOptions) {
        self.set_parallelism(options.parallelism);
        log::debug!("parallelism: {}", self.parallelism);
        self.notes_files = ReleaseNotesFiles {
            notes: options.release_notes.clone(),
            header: options.release_header.clone(),
            footer: options.release_footer.clone(),
        };
        self.set_flags(RunFlags {
            snapshot: options.snapshot,
            skip_publish: options.skip_publish,
            skip_validate: options.skip_validate,
            skip_sign: options.skip_sign,
            remove_dist: options.rm_dist,
        });
        if options.deprecated {
            self.mark_deprecated();
        }
    }

    /// Set the concurrency hint; zero is treated as one
    pub fn set_parallelism(&mut self, parallelism: usize) {
        self.parallelism = parallelism.max(1);
    }

    /// Store requested flags in resolved form
    pub fn set_flags(&mut self, requested: RunFlags) {
        self.flags = requested.resolve();
    }

    /// Record that deprecated settings were used
    pub fn mark_deprecated(&mut self) {
        self.deprecated = true;
    }

    /// Loaded project configuration
    pub fn config(&self) -> &Project {
        &self.config
    }

    /// Shared handle to the configuration, for stage workers
    pub fn config_arc(&self) -> Arc<Project> {
        Arc::clone(&self.config)
    }

    /// Concurrency hint for stage-internal work
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Resolved run flags
    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    /// Release notes files given by the operator
    pub fn notes_files(&self) -> &ReleaseNotesFiles {
        &self.notes_files
    }

    /// Whether deprecated settings were detected
    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    /// Distribution directory from the configuration
    pub fn dist(&self) -> &Path {
        &self.config.dist
    }

    /// Cancellation handle for this run
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Whether the run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Wait until the run is cancelled
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Wall-clock time since the context was created
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Configured run timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Instant at which the run times out, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Current nesting depth of the logging middleware
    pub(crate) fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Shared nesting counter, restored by the logging middleware when a stage ends
    pub(crate) fn nesting(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.depth)
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
