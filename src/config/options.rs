//! Run options supplied by the operator for a single release.

use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent sub-tasks a stage may run
pub const DEFAULT_PARALLELISM: usize = 4;

/// Default timeout for the whole release (30 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Options for a release run, as requested by the operator
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Config file path; `None` uses the default lookup
    pub config: Option<PathBuf>,
    /// Markdown file replacing generated release notes
    pub release_notes: Option<PathBuf>,
    /// Markdown file prepended to release notes
    pub release_header: Option<PathBuf>,
    /// Markdown file appended to release notes
    pub release_footer: Option<PathBuf>,
    /// Unversioned dry run; implies skip_publish and skip_validate
    pub snapshot: bool,
    /// Skip publishing artifacts
    pub skip_publish: bool,
    /// Skip signing artifacts
    pub skip_sign: bool,
    /// Skip sanity checks
    pub skip_validate: bool,
    /// Remove the dist directory before building
    pub rm_dist: bool,
    /// Force the deprecation warning path (tests only)
    pub deprecated: bool,
    /// Concurrency hint for stages
    pub parallelism: usize,
    /// Timeout for the entire release
    pub timeout: Duration,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            config: None,
            release_notes: None,
            release_header: None,
            release_footer: None,
            snapshot: false,
            skip_publish: false,
            skip_sign: false,
            skip_validate: false,
            rm_dist: false,
            deprecated: false,
            parallelism: DEFAULT_PARALLELISM,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
