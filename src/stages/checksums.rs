//! SHA-256 checksums for collected artifacts.

use crate::context::{Artifact, ArtifactKind, Context};
use crate::error::Result;
use crate::pipeline::{Group, skip};
use anyhow::Context as _;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub(crate) const NAME: &str = "calculating checksums";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let files: Vec<(usize, PathBuf)> = ctx
        .artifacts
        .iter()
        .enumerate()
        .filter(|(_, artifact)| artifact.kind == ArtifactKind::File)
        .map(|(index, artifact)| (index, artifact.path.clone()))
        .collect();
    if files.is_empty() {
        return Err(skip("no artifacts to checksum"));
    }

    let digests = Arc::new(Mutex::new(Vec::with_capacity(files.len())));
    let mut group = Group::new(ctx);
    for (index, path) in files {
        let digests = Arc::clone(&digests);
        group.spawn(async move {
            let digest = tokio::task::spawn_blocking({
                let path = path.clone();
                move || sha256_file(&path)
            })
            .await
            .map_err(anyhow::Error::from)?
            .with_context(|| format!("failed to checksum {}", path.display()))?;
            digests.lock().await.push((index, digest));
            Ok(())
        });
    }
    group.wait().await?;

    for (index, digest) in std::mem::take(&mut *digests.lock().await) {
        ctx.artifacts[index].sha256 = Some(digest);
    }

    let mut lines = String::new();
    for artifact in ctx.artifacts.iter().filter(|a| a.kind == ArtifactKind::File) {
        if let Some(digest) = &artifact.sha256 {
            lines.push_str(&format!("{digest}  {}\n", artifact.name));
        }
    }

    let name = ctx.config().checksum.name_template.clone();
    let path = ctx.dist().join(&name);
    tokio::fs::write(&path, lines)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    ctx.artifacts
        .push(Artifact::new(name, path, ArtifactKind::Checksum));
    Ok(())
}

/// Hex SHA-256 digest of a file's contents
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
