//! Artifacts recorded on the context so later stages can find earlier stages' output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of file a stage produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Regular distribution file
    File,
    /// Checksum listing
    Checksum,
    /// Detached signature
    Signature,
    /// Release metadata document
    Metadata,
}

/// A file produced during the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// File name, relative to the dist directory
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    /// What the file is
    pub kind: ArtifactKind,
    /// Hex SHA-256 digest, when computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Artifact {
    /// Create an artifact without a digest
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            sha256: None,
        }
    }
}
