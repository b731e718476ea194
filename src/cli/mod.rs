//! Command line interface for kodegen_release_pipeline.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, ReleaseArgs, RuntimeConfig, parse_duration};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point for already parsed arguments
pub async fn run(args: Args) -> Result<i32> {
    execute_command(args).await
}
