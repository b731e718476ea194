//! Assembles release notes from operator-supplied markdown files.

use crate::context::Context;
use crate::error::Result;
use crate::pipeline::skip;
use anyhow::Context as _;

pub(crate) const NAME: &str = "loading release notes";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    let files = ctx.notes_files().clone();
    let ordered = [&files.header, &files.notes, &files.footer];
    if ordered.iter().all(|path| path.is_none()) {
        return Err(skip("no release notes files given"));
    }

    let mut sections = Vec::new();
    for path in ordered.into_iter().flatten() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read release notes from {}", path.display()))?;
        let content = content.trim();
        if !content.is_empty() {
            sections.push(content.to_string());
        }
    }

    let notes = sections.join("\n\n");
    log::debug!("release notes: {} bytes", notes.len());
    ctx.release_notes = Some(notes);
    Ok(())
}
