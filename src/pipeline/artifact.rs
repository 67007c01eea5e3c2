//! Persisted artifacts and the completion check
//!
//! An artifact is only a location plus a kind tag. Whether it exists is
//! probed on every query, never cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// What kind of filesystem entry an artifact denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    File,
    Directory,
}

/// A named, addressable unit of persisted state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    path: PathBuf,
    kind: ArtifactKind,
}

impl Artifact {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Artifact {
            path: path.into(),
            kind: ArtifactKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Artifact {
            path: path.into(),
            kind: ArtifactKind::Directory,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Presence probe. An empty directory or zero-length file still exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Whether this artifact counts as produced under the given policy
    pub fn satisfies(&self, policy: CompletionPolicy) -> bool {
        match policy {
            CompletionPolicy::Presence => self.exists(),
            CompletionPolicy::NonEmpty => match self.kind {
                ArtifactKind::File => fs::metadata(&self.path)
                    .map(|m| m.is_file() && m.len() > 0)
                    .unwrap_or(false),
                ArtifactKind::Directory => fs::read_dir(&self.path)
                    .map(|mut entries| entries.next().is_some())
                    .unwrap_or(false),
            },
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// How strictly declared outputs are inspected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    /// The path exists, whatever its content
    #[default]
    Presence,

    /// Files must be non-empty and directories must have at least one entry
    NonEmpty,
}

/// Conjunction over every declared output.
///
/// A task that declares no outputs is never complete.
pub fn is_complete(outputs: &[Artifact], policy: CompletionPolicy) -> bool {
    !outputs.is_empty() && outputs.iter().all(|a| a.satisfies(policy))
}

/// Declared outputs that do not satisfy the policy
pub fn missing_outputs(outputs: &[Artifact], policy: CompletionPolicy) -> Vec<PathBuf> {
    outputs
        .iter()
        .filter(|a| !a.satisfies(policy))
        .map(|a| a.path().to_path_buf())
        .collect()
}
