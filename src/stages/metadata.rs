//! Machine-readable summary of the release written into dist.

use crate::context::{Artifact, ArtifactKind, Context};
use crate::error::Result;
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub(crate) const NAME: &str = "writing metadata";

/// File name of the metadata document inside dist
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Serialize)]
struct ReleaseMetadata<'a> {
    project_name: &'a str,
    snapshot: bool,
    date: DateTime<Utc>,
    parallelism: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_notes: Option<&'a str>,
    artifacts: &'a [Artifact],
}

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let metadata = ReleaseMetadata {
        project_name: &ctx.config().project_name,
        snapshot: ctx.flags().snapshot,
        date: Utc::now(),
        parallelism: ctx.parallelism(),
        release_notes: ctx.release_notes.as_deref(),
        artifacts: &ctx.artifacts,
    };
    let json = serde_json::to_string_pretty(&metadata)?;

    let path = ctx.dist().join(METADATA_FILE);
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    ctx.artifacts
        .push(Artifact::new(METADATA_FILE, path, ArtifactKind::Metadata));
    Ok(())
}
