//! Error types for release pipeline operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::context::CancelReason;

/// Result type alias for release pipeline operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release pipeline operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors, raised before any stage runs
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A stage reported an error or terminated abnormally
    #[error("{0}")]
    Stage(#[from] StageError),

    /// The run was cancelled by an interrupt or the run timeout
    #[error("{0}")]
    Cancelled(CancelReason),

    /// A stage intentionally did nothing; never aborts the run
    #[error("skipped: {reason}")]
    Skipped {
        /// Why the stage was skipped
        reason: String,
    },

    /// Top-level envelope for a failed run
    #[error("release failed after {:.2}s: {source}", .elapsed.as_secs_f64())]
    Failed {
        /// Time since the run started
        elapsed: Duration,
        /// The first error the run hit
        source: Box<ReleaseError>,
    },

    /// Top-level envelope for a cancelled run
    #[error("release cancelled after {:.2}s: {reason}", .elapsed.as_secs_f64())]
    Aborted {
        /// Time since the run started
        elapsed: Duration,
        /// What stopped the run
        reason: CancelReason,
    },

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Stage-level errors produced by the error-handling middleware
#[derive(Error, Debug)]
pub enum StageError {
    /// Stage action returned an error
    #[error("{stage}: {source}")]
    Failed {
        /// Stage name
        stage: String,
        /// Error reported by the stage
        source: Box<ReleaseError>,
    },

    /// Stage action panicked
    #[error("{stage}: stage panicked: {message}")]
    Panicked {
        /// Stage name
        stage: String,
        /// Panic payload rendered as text
        message: String,
    },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file does not exist
    #[error("config file not found: {path}")]
    NotFound {
        /// Requested path
        path: PathBuf,
    },

    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for a project
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl StageError {
    /// Name of the stage this error belongs to
    pub fn stage(&self) -> &str {
        match self {
            StageError::Failed { stage, .. } | StageError::Panicked { stage, .. } => stage,
        }
    }
}

impl ReleaseError {
    /// Wrap an error in the top-level envelope, keeping cancellation distinct from failure.
    pub fn after(elapsed: Duration, error: ReleaseError) -> Self {
        match error {
            ReleaseError::Cancelled(reason) => ReleaseError::Aborted { elapsed, reason },
            already @ (ReleaseError::Failed { .. } | ReleaseError::Aborted { .. }) => already,
            other => ReleaseError::Failed {
                elapsed,
                source: Box::new(other),
            },
        }
    }

    /// Whether this error means "it was stopped" rather than "something broke"
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ReleaseError::Cancelled(_) | ReleaseError::Aborted { .. }
        )
    }

    /// Name of the stage that failed, looking through envelopes
    pub fn stage(&self) -> Option<&str> {
        match self {
            ReleaseError::Stage(stage) => Some(stage.stage()),
            ReleaseError::Failed { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_cancellation() { 130 } else { 1 }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Failed { source, .. } => source.recovery_suggestions(),
            ReleaseError::Config(ConfigError::NotFound { path }) => vec![
                format!("Check that {} exists", path.display()),
                "Omit --config to use the default config file lookup".to_string(),
            ],
            ReleaseError::Config(ConfigError::Parse { .. }) => vec![
                "Run the `check` command to validate the config file".to_string(),
            ],
            ReleaseError::Aborted {
                reason: CancelReason::DeadlineExceeded { .. },
                ..
            }
            | ReleaseError::Cancelled(CancelReason::DeadlineExceeded { .. }) => vec![
                "Increase the run timeout with --timeout".to_string(),
            ],
            ReleaseError::Stage(StageError::Panicked { .. }) => vec![
                "This is a bug in the stage, please report it".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
