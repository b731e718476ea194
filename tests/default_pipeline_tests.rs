use kodegen_release_pipeline::stages::{METADATA_FILE, checksum_file};
use kodegen_release_pipeline::{
    ArtifactKind, Project, ReleaseError, ReleaseOptions, Supervisor, default_pipeline, release,
};
use std::path::Path;
use std::time::Duration;

fn project_in(dir: &Path) -> Project {
    let source = dir.join("build");
    std::fs::create_dir_all(source.join("docs")).expect("mkdir");
    std::fs::write(source.join("app"), b"binary contents").expect("write");
    std::fs::write(source.join("docs/CHANGELOG.md"), b"# changes").expect("write");

    Project {
        project_name: "demo".to_string(),
        dist: dir.join("dist"),
        files: vec![source.join("app"), source.join("docs")],
        ..Project::default()
    }
}

fn supervisor() -> Supervisor {
    Supervisor::without_signals().with_grace_period(Duration::from_millis(200))
}

#[tokio::test]
async fn test_snapshot_release_produces_dist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let project = project_in(dir.path());
    let notes = dir.path().join("notes.md");
    std::fs::write(&notes, "* first release\n").expect("write");

    let options = ReleaseOptions {
        snapshot: true,
        release_notes: Some(notes),
        ..ReleaseOptions::default()
    };
    let report = release(project, &options, &default_pipeline(), supervisor())
        .await
        .expect("snapshot release succeeds");

    let dist = dir.path().join("dist");
    let names: Vec<_> = report.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["app", "docs/CHANGELOG.md", "checksums.txt", METADATA_FILE]
    );
    assert_eq!(report.release_notes.as_deref(), Some("* first release"));

    let checksums = std::fs::read_to_string(dist.join("checksums.txt")).expect("read");
    let app_digest = checksum_file(&dist.join("app")).expect("hash");
    assert!(checksums.contains(&format!("{app_digest}  app\n")));
    assert!(checksums.contains("  docs/CHANGELOG.md\n"));

    let metadata: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dist.join(METADATA_FILE)).expect("read"),
    )
    .expect("json");
    assert_eq!(metadata["project_name"], "demo");
    assert_eq!(metadata["snapshot"], true);
    assert_eq!(metadata["artifacts"].as_array().map(Vec::len), Some(3));
    assert!(
        report
            .artifacts
            .iter()
            .all(|a| a.kind != ArtifactKind::Signature)
    );
}

#[tokio::test]
async fn test_dirty_dist_fails_until_rm_dist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dist = dir.path().join("dist");
    std::fs::create_dir_all(&dist).expect("mkdir");
    std::fs::write(dist.join("stale.tar.gz"), b"old").expect("write");

    let err = release(
        project_in(dir.path()),
        &ReleaseOptions::default(),
        &default_pipeline(),
        supervisor(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ReleaseError::Failed { .. }));
    assert_eq!(err.stage(), Some("cleaning distribution directory"));
    assert!(err.to_string().contains("--rm-dist"));

    let options = ReleaseOptions {
        rm_dist: true,
        skip_publish: true,
        ..ReleaseOptions::default()
    };
    release(project_in(dir.path()), &options, &default_pipeline(), supervisor())
        .await
        .expect("rm-dist release succeeds");
    assert!(!dist.join("stale.tar.gz").exists());
    assert!(dist.join("app").is_file());
}

#[tokio::test]
async fn test_validation_failure_stops_before_dist_is_touched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut project = project_in(dir.path());
    project.files.push(dir.path().join("missing"));

    let err = release(project, &ReleaseOptions::default(), &default_pipeline(), supervisor())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some("validating environment"));
    assert!(!dir.path().join("dist").exists());
}

#[tokio::test]
async fn test_deprecated_config_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut project = project_in(dir.path());
    project.archive = Some(toml::Value::String("tar.gz".to_string()));

    let options = ReleaseOptions {
        skip_publish: true,
        ..ReleaseOptions::default()
    };
    let report = release(project, &options, &default_pipeline(), supervisor())
        .await
        .expect("deprecations never fail the run");
    assert!(report.deprecated);
}

#[cfg(unix)]
#[tokio::test]
async fn test_sign_and_publish_commands_run() {
    use kodegen_release_pipeline::config::CommandConfig;

    let dir = tempfile::tempdir().expect("tempdir");
    let published = dir.path().join("published.txt");
    let mut project = project_in(dir.path());
    project.sign = Some(CommandConfig {
        cmd: "cp".to_string(),
        args: vec!["{artifact}".to_string(), "{signature}".to_string()],
    });
    project.publish = Some(CommandConfig {
        cmd: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            format!("ls {{dist}} > {}", published.display()),
        ],
    });

    let report = release(project, &ReleaseOptions::default(), &default_pipeline(), supervisor())
        .await
        .expect("full release succeeds");

    assert!(
        report
            .artifacts
            .iter()
            .any(|a| a.kind == ArtifactKind::Signature && a.name == "checksums.txt.sig")
    );
    let listing = std::fs::read_to_string(&published).expect("publish ran");
    assert!(listing.contains("checksums.txt.sig"));
    assert!(listing.contains(METADATA_FILE));
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_publish_fails_release() {
    use kodegen_release_pipeline::config::CommandConfig;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut project = project_in(dir.path());
    project.publish = Some(CommandConfig {
        cmd: "sh".to_string(),
        args: vec!["-c".to_string(), "echo upload refused >&2; exit 1".to_string()],
    });

    let err = release(project, &ReleaseOptions::default(), &default_pipeline(), supervisor())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some("publishing"));
    assert!(err.to_string().contains("upload refused"));
    assert_eq!(err.exit_code(), 1);
}
