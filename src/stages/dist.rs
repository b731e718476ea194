//! Prepares an empty distribution directory.

use crate::context::Context;
use crate::error::Result;
use anyhow::{Context as _, anyhow};

pub(crate) const NAME: &str = "cleaning distribution directory";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let dist = ctx.dist().to_path_buf();

    if ctx.flags().remove_dist && tokio::fs::metadata(&dist).await.is_ok() {
        log::info!("removing {}", dist.display());
        tokio::fs::remove_dir_all(&dist)
            .await
            .with_context(|| format!("failed to remove {}", dist.display()))?;
    }

    match tokio::fs::read_dir(&dist).await {
        Ok(mut entries) => {
            if entries.next_entry().await?.is_some() {
                return Err(anyhow!(
                    "{} is not empty, remove it before running or use --rm-dist",
                    dist.display()
                )
                .into());
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    tokio::fs::create_dir_all(&dist)
        .await
        .with_context(|| format!("failed to create {}", dist.display()))?;
    Ok(())
}
