//! Command line argument parsing.

use crate::config::{DEFAULT_PARALLELISM, ReleaseOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Staged release pipeline runner
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_release_pipeline",
    version,
    about = "Run a project's release pipeline",
    long_about = "Run the configured release stages in order: validation, dist preparation,
release notes, artifact collection, checksums, signing, metadata and publishing.

Usage:
  kodegen_release_pipeline release --rm-dist
  kodegen_release_pipeline release --snapshot --timeout 5m
  kodegen_release_pipeline check -f release.toml"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Release the current project
    #[command(visible_alias = "r")]
    Release(ReleaseArgs),

    /// Check that the configuration loads and report deprecated keys
    Check {
        /// Configuration file to check
        #[arg(short = 'f', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Flags of the `release` subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Load configuration from file
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load custom release notes from a markdown file
    #[arg(long, value_name = "FILE")]
    pub release_notes: Option<PathBuf>,

    /// Load custom release notes header from a markdown file
    #[arg(long, value_name = "FILE")]
    pub release_header: Option<PathBuf>,

    /// Load custom release notes footer from a markdown file
    #[arg(long, value_name = "FILE")]
    pub release_footer: Option<PathBuf>,

    /// Generate an unversioned snapshot release, skipping all validations and without publishing any artifacts
    #[arg(long)]
    pub snapshot: bool,

    /// Skip publishing artifacts
    #[arg(long)]
    pub skip_publish: bool,

    /// Skip signing artifacts
    #[arg(long)]
    pub skip_sign: bool,

    /// Skip all the validations against the release
    #[arg(long)]
    pub skip_validate: bool,

    /// Remove the dist folder before building
    #[arg(long)]
    pub rm_dist: bool,

    /// Amount tasks to run concurrently
    #[arg(short = 'p', long, default_value_t = DEFAULT_PARALLELISM, value_name = "N")]
    pub parallelism: usize,

    /// Timeout to the entire release process (e.g. 30m, 1h30m, 1.5h)
    #[arg(long, default_value = "30m", value_parser = parse_duration, value_name = "DURATION")]
    pub timeout: Duration,

    /// Force the deprecation warning
    #[arg(long, hide = true)]
    pub deprecated: bool,
}

impl From<&ReleaseArgs> for ReleaseOptions {
    fn from(args: &ReleaseArgs) -> Self {
        Self {
            config: args.config.clone(),
            release_notes: args.release_notes.clone(),
            release_header: args.release_header.clone(),
            release_footer: args.release_footer.clone(),
            snapshot: args.snapshot,
            skip_publish: args.skip_publish,
            skip_sign: args.skip_sign,
            skip_validate: args.skip_validate,
            rm_dist: args.rm_dist,
            deprecated: args.deprecated,
            parallelism: args.parallelism,
            timeout: args.timeout,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Release(release) = &self.command
            && release.parallelism == 0
        {
            return Err("--parallelism must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Parse durations such as `90s`, `30m`, `1h30m`, `1.5h` or `500ms`.
///
/// A bare whole number is read as seconds. Unit segments past roughly 584
/// years are rejected.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let s = value.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let len = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(format!("invalid duration {value:?}"));
        }
        let amount: f64 = rest[..len]
            .parse()
            .map_err(|_| format!("invalid number {:?} in duration {value:?}", &rest[..len]))?;
        rest = &rest[len..];

        let unit_len = rest.find(is_number).unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration {value:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {value:?}")),
        };
        let too_large = || format!("duration {value:?} is too large");
        let nanos = amount * unit_nanos;
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Err(too_large());
        }
        let part = Duration::from_nanos(nanos.round() as u64);
        total = total.checked_add(part).ok_or_else(too_large)?;
        rest = &rest[unit_len..];
    }
    Ok(total)
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        self.output.println(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        self.output.progress(message);
    }

    /// Print error message
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message);
    }

    /// Whether debug output was requested
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.debug)
    }
}
