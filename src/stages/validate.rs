//! Sanity checks run before anything touches the filesystem.

use crate::context::Context;
use crate::error::Result;
use crate::pipeline::skip;
use anyhow::anyhow;
use std::path::{Component, Path};

use super::files;

pub(crate) const NAME: &str = "validating environment";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    if ctx.flags().skip_validate {
        return Err(skip("validation is disabled"));
    }

    let config = ctx.config();
    check_dist(&config.dist)?;

    if let Some(entry) = config.env.iter().find(|entry| !entry.contains('=')) {
        return Err(anyhow!("invalid env entry {entry:?}, expected KEY=VALUE").into());
    }

    for file in &config.files {
        files::check_entry(file)?;
        if tokio::fs::metadata(file).await.is_err() {
            return Err(anyhow!("configured file {} does not exist", file.display()).into());
        }
    }

    let notes = ctx.notes_files();
    for path in [&notes.notes, &notes.header, &notes.footer].into_iter().flatten() {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(anyhow!("release notes file {} does not exist", path.display()).into());
        }
    }

    Ok(())
}

/// The dist directory may be removed with --rm-dist, so it must not be the
/// working directory, the filesystem root or a parent of the working directory.
fn check_dist(dist: &Path) -> Result<()> {
    let unsafe_dist = dist.as_os_str().is_empty()
        || dist.parent().is_none()
        || dist.components().all(|c| matches!(c, Component::CurDir))
        || dist.components().any(|c| matches!(c, Component::ParentDir));
    if unsafe_dist {
        return Err(anyhow!("refusing to use {:?} as the dist directory", dist).into());
    }
    Ok(())
}
