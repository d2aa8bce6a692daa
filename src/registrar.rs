//! Attached-artifact registration.
//!
//! The host build tool owns the notion of "attached artifacts"; the
//! packager only needs one capability: record that the archive exists
//! under a type and classifier. [`ManifestRegistrar`] persists the
//! attachments to a JSON manifest in the build directory so install and
//! deploy steps can pick the archive up.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside the build directory.
pub const ATTACHMENTS_MANIFEST: &str = "attached-artifacts.json";

/// One registered secondary build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedArtifact {
    pub path: PathBuf,
    pub artifact_type: String,
    pub classifier: String,
}

/// Capability to register a secondary build output.
pub trait ArtifactRegistrar {
    fn attach(&mut self, path: &Path, artifact_type: &str, classifier: &str) -> Result<()>;
}

/// Registrar that appends attachments to `<build_dir>/attached-artifacts.json`.
///
/// Re-attaching the same path/type/classifier triple replaces the prior
/// entry instead of duplicating it, so re-running the packager leaves a
/// single entry per archive.
#[derive(Debug)]
pub struct ManifestRegistrar {
    manifest_path: PathBuf,
}

impl ManifestRegistrar {
    pub fn for_build_dir(build_dir: &Path) -> Self {
        Self {
            manifest_path: build_dir.join(ATTACHMENTS_MANIFEST),
        }
    }

    /// Load the current manifest, or an empty list when absent.
    pub fn load(&self) -> Result<Vec<AttachedArtifact>> {
        if !self.manifest_path.is_file() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.manifest_path).with_context(|| {
            format!(
                "reading attachments manifest '{}'",
                self.manifest_path.display()
            )
        })?;
        serde_json::from_slice(&bytes).with_context(|| {
            format!(
                "parsing attachments manifest '{}'",
                self.manifest_path.display()
            )
        })
    }

    fn store(&self, attachments: &[AttachedArtifact]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(attachments).context("encoding attachments")?;
        fs::write(&self.manifest_path, bytes).with_context(|| {
            format!(
                "writing attachments manifest '{}'",
                self.manifest_path.display()
            )
        })
    }
}

impl ArtifactRegistrar for ManifestRegistrar {
    fn attach(&mut self, path: &Path, artifact_type: &str, classifier: &str) -> Result<()> {
        let mut attachments = self.load()?;
        attachments.retain(|existing| {
            existing.artifact_type != artifact_type || existing.classifier != classifier
        });
        attachments.push(AttachedArtifact {
            path: path.to_path_buf(),
            artifact_type: artifact_type.to_string(),
            classifier: classifier.to_string(),
        });
        self.store(&attachments)
    }
}

/// In-memory registrar for tests and embedding callers that manage
/// attachment persistence themselves.
#[derive(Debug, Default)]
pub struct RecordingRegistrar {
    pub attachments: Vec<AttachedArtifact>,
}

impl ArtifactRegistrar for RecordingRegistrar {
    fn attach(&mut self, path: &Path, artifact_type: &str, classifier: &str) -> Result<()> {
        self.attachments.push(AttachedArtifact {
            path: path.to_path_buf(),
            artifact_type: artifact_type.to_string(),
            classifier: classifier.to_string(),
        });
        Ok(())
    }
}
