//! Reports deprecated configuration keys without failing the run.

use crate::context::Context;
use crate::error::Result;

pub(crate) const NAME: &str = "checking deprecations";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let notices = ctx.config().deprecations();
    for notice in &notices {
        log::warn!("DEPRECATED: {notice}");
    }
    if !notices.is_empty() {
        ctx.mark_deprecated();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Project;

    #[tokio::test]
    async fn test_marks_context_when_deprecated_keys_present() {
        let project = Project::parse(
            std::path::Path::new("release.toml"),
            "[fpm]\nformats = [\"rpm\"]\n",
        )
        .expect("valid config");
        let mut ctx = Context::new(project);
        run(&mut ctx).await.expect("never fails");
        assert!(ctx.deprecated());
    }

    #[tokio::test]
    async fn test_clean_config_is_not_marked() {
        let mut ctx = Context::new(Project::default());
        run(&mut ctx).await.expect("never fails");
        assert!(!ctx.deprecated());
    }
}
