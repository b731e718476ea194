//! `check` subcommand: load the configuration without running any stage.

use crate::cli::RuntimeConfig;
use crate::config::load_config;
use crate::error::Result;
use std::path::Path;

pub(super) async fn execute_check(path: Option<&Path>, config: &RuntimeConfig) -> Result<()> {
    let project = load_config(path)?;

    let notices = project.deprecations();
    for notice in &notices {
        config.warning_println(&format!("DEPRECATED: {notice}"));
    }
    if notices.is_empty() {
        config.success_println("config is valid");
    } else {
        config.warning_println(super::release::DEPRECATION_WARNING);
    }
    Ok(())
}
