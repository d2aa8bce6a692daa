//! Project descriptor: the read-only build metadata the packager consumes.
//!
//! The descriptor is supplied once per packaging run, either constructed
//! directly by an embedding build tool or loaded from a small TOML file by
//! the CLI. Nothing in the packager ever mutates it.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Packaging type of a `pom` project; such projects produce no binary
/// artifact and the packager skips them entirely.
pub const POM_PACKAGING: &str = "pom";

/// Read-only metadata describing the project being packaged.
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    /// Artifact identifier, e.g. `demo`.
    pub artifact_id: String,
    /// Project version, e.g. `1.0.0`.
    pub version: String,
    /// Packaging type: `jar`, `war`, `ear` or `pom`.
    pub packaging: String,
    /// Build output directory, e.g. `target/`.
    pub build_dir: PathBuf,
    /// Project base directory (where `src/main/bin` and `src/main/conf`
    /// may live).
    pub base_dir: PathBuf,
    /// Base name of the primary artifact file, without extension.
    pub final_name: String,
}

impl ProjectDescriptor {
    /// Whether this is a `pom` project (skip guard).
    pub fn is_pom(&self) -> bool {
        self.packaging == POM_PACKAGING
    }

    /// Expected location of the primary artifact:
    /// `<build_dir>/<final_name>.<packaging>`.
    pub fn primary_artifact_path(&self) -> PathBuf {
        self.build_dir
            .join(format!("{}.{}", self.final_name, self.packaging))
    }

    /// File name of the primary artifact, e.g. `demo-1.0.0.jar`.
    pub fn primary_artifact_file_name(&self) -> String {
        format!("{}.{}", self.final_name, self.packaging)
    }

    /// Name of the distribution archive for the given classifier:
    /// `<artifact_id>-<version>-<classifier>.zip`.
    pub fn archive_file_name(&self, classifier: &str) -> String {
        format!("{}-{}-{}.zip", self.artifact_id, self.version, classifier)
    }

    /// Validate identifier fields.
    ///
    /// Identifiers end up in file names, so path separators and empty
    /// values are rejected up front rather than producing a confusing
    /// archive path later.
    pub fn validate(&self) -> Result<()> {
        validate_name_component("artifact_id", &self.artifact_id)?;
        validate_name_component("version", &self.version)?;
        validate_name_component("packaging", &self.packaging)?;
        validate_name_component("final_name", &self.final_name)?;
        Ok(())
    }
}

fn validate_name_component(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("project {field} must not be empty");
    }
    if value.contains('/') || value.contains('\\') {
        bail!("project {field} must not contain path separators: '{value}'");
    }
    if value.contains("..") {
        bail!("project {field} must not contain '..': '{value}'");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectToml {
    project: ProjectTableToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectTableToml {
    artifact_id: String,
    version: String,
    packaging: String,
    build_dir: String,
    base_dir: Option<String>,
    final_name: Option<String>,
    classifier: Option<String>,
}

/// Descriptor plus the optional classifier override, as loaded from a
/// project TOML file.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub descriptor: ProjectDescriptor,
    pub classifier: Option<String>,
}

/// Load a project descriptor from a TOML file.
///
/// Relative `build_dir` and `base_dir` values are resolved against the
/// TOML file's own directory. `base_dir` defaults to that directory and
/// `final_name` defaults to `<artifact_id>-<version>`.
pub fn load_project(path: &Path) -> Result<LoadedProject> {
    let bytes = fs::read_to_string(path)
        .with_context(|| format!("reading project file '{}'", path.display()))?;
    let parsed: ProjectToml = toml::from_str(&bytes)
        .with_context(|| format!("parsing project file '{}'", path.display()))?;
    let table = parsed.project;

    let file_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base_dir = match table.base_dir {
        Some(raw) => resolve_against(file_dir, &raw),
        None => file_dir.to_path_buf(),
    };
    let final_name = table
        .final_name
        .unwrap_or_else(|| format!("{}-{}", table.artifact_id, table.version));

    let descriptor = ProjectDescriptor {
        artifact_id: table.artifact_id,
        version: table.version,
        packaging: table.packaging,
        build_dir: resolve_against(file_dir, &table.build_dir),
        base_dir,
        final_name,
    };
    descriptor
        .validate()
        .with_context(|| format!("invalid project file '{}'", path.display()))?;

    Ok(LoadedProject {
        descriptor,
        classifier: table.classifier,
    })
}

fn resolve_against(dir: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        dir.join(candidate)
    }
}
