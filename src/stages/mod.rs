//! Built-in release stages and the default pipeline.
//!
//! Each stage is a plain async function over the [`Context`]. A stage with
//! nothing to do returns [`skip`](crate::pipeline::skip) instead of succeeding
//! silently so the operator can see why it did not run.

mod checksums;
mod command;
mod deprecations;
mod dist;
mod files;
mod metadata;
mod notes;
mod publish;
mod sign;
mod validate;

pub use checksums::sha256_file as checksum_file;
pub use metadata::METADATA_FILE;

use crate::context::Context;
use crate::pipeline::{Pipeline, Stage};

/// Built-in stages in execution order
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new(validate::NAME, |ctx: &mut Context| Box::pin(validate::run(ctx))),
        Stage::new(dist::NAME, |ctx: &mut Context| Box::pin(dist::run(ctx))),
        Stage::new(deprecations::NAME, |ctx: &mut Context| {
            Box::pin(deprecations::run(ctx))
        }),
        Stage::new(notes::NAME, |ctx: &mut Context| Box::pin(notes::run(ctx))),
        Stage::new(files::NAME, |ctx: &mut Context| Box::pin(files::run(ctx))),
        Stage::new(checksums::NAME, |ctx: &mut Context| Box::pin(checksums::run(ctx))),
        Stage::new(sign::NAME, |ctx: &mut Context| Box::pin(sign::run(ctx))),
        Stage::new(metadata::NAME, |ctx: &mut Context| Box::pin(metadata::run(ctx))),
        Stage::new(publish::NAME, |ctx: &mut Context| Box::pin(publish::run(ctx))),
    ]
}

/// Default stages wrapped in the default middleware chain
pub fn default_pipeline() -> Pipeline {
    Pipeline::new(default_stages())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_order() {
        let pipeline = default_pipeline();
        assert_eq!(
            pipeline.names().collect::<Vec<_>>(),
            vec![
                "validating environment",
                "cleaning distribution directory",
                "checking deprecations",
                "loading release notes",
                "collecting artifacts",
                "calculating checksums",
                "signing artifacts",
                "writing metadata",
                "publishing",
            ]
        );
    }
}
