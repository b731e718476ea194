//! Project configuration loading.
//!
//! The release engine consumes a fully loaded [`Project`]; this module is the
//! loader that produces it from a TOML file, plus the run options that the
//! CLI hands to the engine.

mod options;

pub use options::{DEFAULT_PARALLELISM, DEFAULT_TIMEOUT, ReleaseOptions};

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config files tried, in order, when no explicit path is given
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    [".release.toml", "release.toml", ".kodegen-release.toml"];

/// Project release configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Project name used in release metadata
    pub project_name: String,
    /// Distribution directory, relative to the working directory
    pub dist: PathBuf,
    /// Extra `KEY=VALUE` environment for commands run by stages
    pub env: Vec<String>,
    /// Files or directories copied into dist as release artifacts
    pub files: Vec<PathBuf>,
    /// Checksum settings
    pub checksum: ChecksumConfig,
    /// Signing command, if any
    pub sign: Option<CommandConfig>,
    /// Publishing command, if any
    pub publish: Option<CommandConfig>,
    /// Deprecated: replaced by `nfpms`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fpm: Option<toml::Value>,
    /// Deprecated: replaced by `archives`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<toml::Value>,
}

/// Checksum file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumConfig {
    /// Name of the checksum file written into dist
    pub name_template: String,
}

/// External command invoked by a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to run
    pub cmd: String,
    /// Arguments; `{artifact}`, `{signature}` and `{dist}` placeholders are filled in by the stage
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            dist: PathBuf::from("dist"),
            env: Vec::new(),
            files: Vec::new(),
            checksum: ChecksumConfig::default(),
            sign: None,
            publish: None,
            fpm: None,
            archive: None,
        }
    }
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            name_template: "checksums.txt".to_string(),
        }
    }
}

impl Project {
    /// Parse a project from TOML text
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Human-readable notices for every deprecated key in use
    pub fn deprecations(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if self.fpm.is_some() {
            notices.push("`fpm` is deprecated, use `nfpms` instead".to_string());
        }
        if self.archive.is_some() {
            notices.push("`archive` is deprecated, use `archives` instead".to_string());
        }
        notices
    }

    /// `env` entries split into key/value pairs; malformed entries are skipped
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().filter_map(|entry| entry.split_once('='))
    }
}

/// Find the first default config file inside `dir`
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Load the project configuration.
///
/// An explicit path must exist. Without one, the default file names are
/// tried in the working directory and an empty project is used when none exist.
pub fn load_config(path: Option<&Path>) -> Result<Project> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            path.to_path_buf()
        }
        None => match find_config(Path::new(".")) {
            Some(found) => found,
            None => {
                log::warn!("could not find a config file, using defaults");
                return Ok(Project::default());
            }
        },
    };

    log::debug!("loading config from {}", path.display());
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    Project::parse(&path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    #[test]
    fn test_defaults_when_fields_missing() {
        let project = Project::parse(Path::new("release.toml"), "project_name = \"demo\"\n")
            .expect("valid config");
        assert_eq!(project.project_name, "demo");
        assert_eq!(project.dist, PathBuf::from("dist"));
        assert_eq!(project.checksum.name_template, "checksums.txt");
        assert!(project.sign.is_none());
        assert!(project.deprecations().is_empty());
    }

    #[test]
    fn test_deprecated_keys_are_reported() {
        let content = r#"
project_name = "demo"

[fpm]
formats = ["deb"]

[archive]
format = "tar.gz"
"#;
        let project = Project::parse(Path::new("release.toml"), content).expect("valid config");
        let notices = project.deprecations();
        assert_eq!(notices.len(), 2);
        assert!(notices[0].contains("fpm"));
        assert!(notices[1].contains("archive"));
    }

    #[test]
    fn test_commands_and_env() {
        let content = r#"
env = ["FOO=bar", "broken"]
files = ["target/release/app", "README.md"]

[sign]
cmd = "gpg"
args = ["--detach-sign", "{artifact}"]
"#;
        let project = Project::parse(Path::new("release.toml"), content).expect("valid config");
        let sign = project.sign.as_ref().expect("sign config");
        assert_eq!(sign.cmd, "gpg");
        assert_eq!(sign.args.len(), 2);
        assert_eq!(project.env_pairs().collect::<Vec<_>>(), vec![("FOO", "bar")]);
        assert_eq!(project.files.len(), 2);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Project::parse(Path::new("bad.toml"), "dist = [").unwrap_err();
        assert!(matches!(err, ReleaseError::Config(ConfigError::Parse { .. })));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ReleaseError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "project_name = \"custom\"\ndist = \"out\"\n").expect("write");
        let project = load_config(Some(&path)).expect("loads");
        assert_eq!(project.project_name, "custom");
        assert_eq!(project.dist, PathBuf::from("out"));
    }

    #[test]
    fn test_find_config_prefers_first_default_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(find_config(dir.path()).is_none());

        std::fs::write(dir.path().join("release.toml"), "").expect("write");
        std::fs::write(dir.path().join(".kodegen-release.toml"), "").expect("write");
        assert_eq!(find_config(dir.path()), Some(dir.path().join("release.toml")));

        std::fs::write(dir.path().join(".release.toml"), "").expect("write");
        assert_eq!(find_config(dir.path()), Some(dir.path().join(".release.toml")));
    }
}
