//! `release` subcommand.

use crate::cli::{ReleaseArgs, RuntimeConfig};
use crate::config::ReleaseOptions;
use crate::error::Result;
use crate::release::release_project;
use crate::stages::default_pipeline;
use crate::supervisor::Supervisor;

/// Warning shown after a run that used deprecated settings
pub const DEPRECATION_WARNING: &str =
    "your config is using deprecated properties, check logs above for details";

pub(super) async fn execute_release(args: &ReleaseArgs, config: &RuntimeConfig) -> Result<()> {
    let options = ReleaseOptions::from(args);
    config.progress_println("releasing...");

    let report = release_project(&options, &default_pipeline(), Supervisor::new()).await?;

    if report.deprecated {
        config.warning_println(DEPRECATION_WARNING);
    }
    if config.is_verbose() {
        for artifact in &report.artifacts {
            config.indent(&format!("{} ({})", artifact.name, artifact.path.display()));
        }
    }
    config.success_println(&format!(
        "release succeeded after {:.2}s",
        report.elapsed.as_secs_f64()
    ));
    Ok(())
}
