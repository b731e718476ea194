//! Command execution for the CLI subcommands.

mod check;
mod release;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, ReleaseError, Result};

use check::execute_check;
use release::execute_release;

/// Execute the subcommand named by the parsed arguments, returning the exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    if let Err(reason) = args.validate() {
        config.error_println(&CliError::InvalidArguments { reason }.to_string());
        return Ok(2);
    }

    let result = match &args.command {
        Command::Release(release) => execute_release(release, &config).await,
        Command::Check { config: path } => execute_check(path.as_deref(), &config).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            report_error(&config, &e);
            Ok(e.exit_code())
        }
    }
}

fn report_error(config: &RuntimeConfig, e: &ReleaseError) {
    config.error_println(&e.to_string());
    let suggestions = e.recovery_suggestions();
    if !suggestions.is_empty() {
        config.println("\nRecovery suggestions:");
        for suggestion in suggestions {
            config.indent(&format!("• {suggestion}"));
        }
    }
}
