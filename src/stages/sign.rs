//! Detached signatures for checksum files.

use super::command::run_command;
use crate::context::{Artifact, ArtifactKind, Context};
use crate::error::Result;
use crate::pipeline::{Group, skip};
use std::sync::Arc;
use tokio::sync::Mutex;

pub(crate) const NAME: &str = "signing artifacts";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    if ctx.flags().skip_sign {
        return Err(skip("signing is disabled"));
    }
    let Some(sign) = ctx.config().sign.clone() else {
        return Err(skip("no sign command configured"));
    };
    let targets: Vec<Artifact> = ctx
        .artifacts
        .iter()
        .filter(|artifact| artifact.kind == ArtifactKind::Checksum)
        .cloned()
        .collect();
    if targets.is_empty() {
        return Err(skip("nothing to sign"));
    }

    let signed = Arc::new(Mutex::new(Vec::new()));
    let mut group = Group::new(ctx);
    for target in targets {
        let project = ctx.config_arc();
        let cancellation = ctx.cancellation().clone();
        let sign = sign.clone();
        let signed = Arc::clone(&signed);
        group.spawn(async move {
            let name = format!("{}.sig", target.name);
            let signature = target.path.with_file_name(&name);
            run_command(
                &project,
                &sign,
                &[
                    ("{artifact}", target.path.display().to_string()),
                    ("{signature}", signature.display().to_string()),
                ],
                &cancellation,
            )
            .await?;

            if tokio::fs::metadata(&signature).await.is_ok() {
                signed
                    .lock()
                    .await
                    .push(Artifact::new(name, signature, ArtifactKind::Signature));
            } else {
                log::warn!("{} did not produce {}", sign.cmd, signature.display());
            }
            Ok(())
        });
    }
    group.wait().await?;

    let mut signatures = std::mem::take(&mut *signed.lock().await);
    signatures.sort_by(|a, b| a.name.cmp(&b.name));
    ctx.artifacts.extend(signatures);
    Ok(())
}
