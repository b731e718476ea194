//! Copies configured files into dist and records them as artifacts.

use crate::context::{Artifact, ArtifactKind, Context};
use crate::error::Result;
use crate::pipeline::{Group, skip};
use anyhow::{Context as _, anyhow};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use walkdir::WalkDir;

pub(crate) const NAME: &str = "collecting artifacts";

pub(crate) async fn run(ctx: &mut Context) -> Result<()> {
    if ctx.config().files.is_empty() {
        return Err(skip("no files configured"));
    }

    let sources = plan(&ctx.config().files)?;
    let dist = ctx.dist().to_path_buf();
    let collected = Arc::new(Mutex::new(Vec::with_capacity(sources.len())));
    let mut group = Group::new(ctx);

    for (name, source) in sources {
        let target = dist.join(&name);
        let collected = Arc::clone(&collected);
        group.spawn(async move {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&source, &target)
                .await
                .with_context(|| format!("failed to copy {}", source.display()))?;
            log::debug!("collected {name}");
            collected
                .lock()
                .await
                .push(Artifact::new(name, target, ArtifactKind::File));
            Ok(())
        });
    }
    group.wait().await?;

    let mut artifacts = std::mem::take(&mut *collected.lock().await);
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    log::info!("collected {} artifacts", artifacts.len());
    ctx.artifacts.extend(artifacts);
    Ok(())
}

/// Map artifact names to source files. Directories contribute every file
/// beneath them, named relative to the directory's parent.
fn plan(files: &[PathBuf]) -> Result<BTreeMap<String, PathBuf>> {
    let mut sources = BTreeMap::new();
    for entry in files {
        check_entry(entry)?;
        let base = entry.parent().unwrap_or_else(|| Path::new(""));
        for found in WalkDir::new(entry).follow_links(true) {
            let found = found.map_err(|e| anyhow!("failed to read {}: {e}", entry.display()))?;
            if !found.file_type().is_file() {
                continue;
            }
            let relative = found.path().strip_prefix(base).unwrap_or(found.path());
            if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
                return Err(anyhow!(
                    "{} would be collected outside the dist directory",
                    found.path().display()
                )
                .into());
            }
            let name = artifact_name(relative);
            if let Some(previous) = sources.insert(name.clone(), found.path().to_path_buf()) {
                return Err(anyhow!(
                    "duplicate artifact {name} from {} and {}",
                    previous.display(),
                    found.path().display()
                )
                .into());
            }
        }
    }
    Ok(sources)
}

/// A files entry must end in a named file or directory. Entries such as
/// `..`, `.` or `/` have no name to collect under inside dist.
pub(crate) fn check_entry(entry: &Path) -> Result<()> {
    if entry.file_name().is_none() {
        return Err(anyhow!(
            "files entry {:?} must name a file or directory",
            entry
        )
        .into());
    }
    Ok(())
}

fn artifact_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Project;

    #[tokio::test]
    async fn test_files_and_directories_are_copied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("app");
        let docs = dir.path().join("docs");
        std::fs::write(&bin, b"binary").expect("write");
        std::fs::create_dir_all(docs.join("guide")).expect("mkdir");
        std::fs::write(docs.join("README.md"), b"readme").expect("write");
        std::fs::write(docs.join("guide/intro.md"), b"intro").expect("write");

        let dist = dir.path().join("dist");
        std::fs::create_dir_all(&dist).expect("mkdir");
        let mut ctx = Context::new(Project {
            dist: dist.clone(),
            files: vec![bin, docs],
            ..Project::default()
        });
        ctx.set_parallelism(2);
        run(&mut ctx).await.expect("collects");

        let names: Vec<_> = ctx.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["app", "docs/README.md", "docs/guide/intro.md"]);
        assert!(ctx.artifacts.iter().all(|a| a.kind == ArtifactKind::File));
        assert_eq!(
            std::fs::read(dist.join("docs/guide/intro.md")).expect("read"),
            b"intro"
        );
    }

    #[tokio::test]
    async fn test_skipped_without_files() {
        let mut ctx = Context::new(Project::default());
        let err = run(&mut ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "skipped: no files configured");
    }

    #[test]
    fn test_entries_without_a_name_are_rejected() {
        for entry in ["..", ".", "/", "build/.."] {
            let err = check_entry(Path::new(entry)).unwrap_err();
            assert!(err.to_string().contains("must name a file or directory"), "{entry}");
        }
        assert!(check_entry(Path::new("build/app")).is_ok());
        assert!(check_entry(Path::new("../shared/app")).is_ok());
    }

    #[tokio::test]
    async fn test_parent_dir_entry_never_escapes_dist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let work = dir.path().join("work");
        std::fs::create_dir_all(work.join("build")).expect("mkdir");
        std::fs::write(dir.path().join("outside.txt"), b"outside").expect("write");

        let dist = work.join("dist");
        std::fs::create_dir_all(&dist).expect("mkdir");
        let mut ctx = Context::new(Project {
            dist: dist.clone(),
            files: vec![work.join("build/../..")],
            ..Project::default()
        });
        let err = run(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("must name a file or directory"));
        assert!(ctx.artifacts.is_empty());
        assert_eq!(std::fs::read_dir(&dist).expect("read dist").count(), 0);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).expect("mkdir");
        std::fs::create_dir_all(&b).expect("mkdir");
        std::fs::write(a.join("app"), b"1").expect("write");
        std::fs::write(b.join("app"), b"2").expect("write");

        let err = plan(&[a.join("app"), b.join("app")]).unwrap_err();
        assert!(err.to_string().contains("duplicate artifact app"));
    }
}
