//! Hands the finished dist directory to the configured publish command.

use super::command::run_command;
use crate::context::Context;
use crate::error::Result;
use crate::pipeline::skip;

pub(crate) const NAME: &str = "publishing";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let flags = ctx.flags();
    if flags.snapshot {
        return Err(skip("publishing is disabled in snapshot mode"));
    }
    if flags.skip_publish {
        return Err(skip("publishing is disabled"));
    }
    let Some(publish) = ctx.config().publish.as_ref() else {
        return Err(skip("no publish command configured"));
    };

    log::info!("publishing {} artifacts", ctx.artifacts.len());
    run_command(
        ctx.config(),
        publish,
        &[("{dist}", ctx.dist().display().to_string())],
        ctx.cancellation(),
    )
    .await
}
