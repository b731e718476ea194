//! External command execution shared by stages.

use crate::config::{CommandConfig, Project};
use crate::context::Cancellation;
use crate::error::{CliError, Result};

/// Run a configured command with its placeholders filled in.
///
/// The child is killed if the run is cancelled before it exits.
pub(crate) async fn run_command(
    project: &Project,
    spec: &CommandConfig,
    replacements: &[(&str, String)],
    cancellation: &Cancellation,
) -> Result<()> {
    let args = render_args(&spec.args, replacements);
    let rendered = format!("{} {}", spec.cmd, args.join(" "));
    log::debug!("running {}", rendered.trim_end());

    let mut command = tokio::process::Command::new(&spec.cmd);
    command
        .args(&args)
        .envs(project.env_pairs())
        .kill_on_drop(true);

    let output = tokio::select! {
        biased;
        _ = cancellation.cancelled() => return Err(cancellation.error()),
        output = command.output() => output.map_err(|e| CliError::ExecutionFailed {
            command: rendered.clone(),
            reason: e.to_string(),
        })?,
    };

    if !output.status.success() {
        return Err(CliError::ExecutionFailed {
            command: rendered,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(())
}

fn render_args(args: &[String], replacements: &[(&str, String)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            replacements
                .iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelReason;
    use crate::error::ReleaseError;

    #[test]
    fn test_render_args() {
        let args = vec![
            "--output".to_string(),
            "{signature}".to_string(),
            "{artifact}".to_string(),
            "plain".to_string(),
        ];
        let rendered = render_args(
            &args,
            &[
                ("{artifact}", "dist/checksums.txt".to_string()),
                ("{signature}", "dist/checksums.txt.sig".to_string()),
            ],
        );
        assert_eq!(
            rendered,
            vec!["--output", "dist/checksums.txt.sig", "dist/checksums.txt", "plain"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_command_reports_stderr() {
        let spec = CommandConfig {
            cmd: "sh".to_string(),
            args: vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()],
        };
        let err = run_command(&Project::default(), &spec, &[], &Cancellation::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Cli(CliError::ExecutionFailed { ref reason, .. }) if reason == "nope"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_is_passed_to_command() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("env.txt");
        let project = Project {
            env: vec!["RELEASE_FLAVOR=nightly".to_string()],
            ..Project::default()
        };
        let spec = CommandConfig {
            cmd: "sh".to_string(),
            args: vec!["-c".to_string(), "printf %s \"$RELEASE_FLAVOR\" > {out}".to_string()],
        };
        run_command(
            &project,
            &spec,
            &[("{out}", out.display().to_string())],
            &Cancellation::new(),
        )
        .await
        .expect("command succeeds");
        assert_eq!(std::fs::read_to_string(&out).expect("read"), "nightly");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_command_stops() {
        let cancellation = Cancellation::new();
        cancellation.cancel(CancelReason::Interrupted);
        let spec = CommandConfig {
            cmd: "sleep".to_string(),
            args: vec!["60".to_string()],
        };
        let err = run_command(&Project::default(), &spec, &[], &cancellation)
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
    }
}
