//! # Release Pipeline
//!
//! Ordered, middleware-wrapped release stages with cooperative cancellation.
//!
//! A release run builds a [`Context`] with a deadline, applies the operator's
//! [`ReleaseOptions`], then drives a [`Pipeline`] of named stages one at a
//! time under a [`Supervisor`] that turns interrupts into cancellation. Every
//! stage is wrapped in [`Logging`](middleware::Logging) and
//! [`ErrorHandler`](middleware::ErrorHandler) middleware; the first failure
//! stops the run and is reported with the elapsed time.
//!
//! ## Usage
//!
//! ```bash
//! kodegen_release_pipeline release --rm-dist
//! kodegen_release_pipeline release --snapshot --timeout 10m
//! kodegen_release_pipeline check -f release.toml
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod release;
pub mod stages;
pub mod supervisor;

pub use config::{Project, ReleaseOptions, load_config};
pub use context::{Artifact, ArtifactKind, CancelReason, Cancellation, Context, ContextGuard, RunFlags};
pub use error::{CliError, ConfigError, ReleaseError, Result, StageError};
pub use middleware::{Chain, ErrorHandler, Logging, Middleware};
pub use pipeline::{Group, Pipeline, Stage, skip};
pub use release::{ReleaseReport, release, release_project};
pub use stages::{default_pipeline, default_stages};
pub use supervisor::Supervisor;
