//! Packaging orchestration.
//!
//! Runs the whole distribution build for one project: provision the
//! staging layout, materialize the launcher and config, merge extra
//! files, copy the primary artifact, zip the staged directories and
//! register the archive. Every step propagates errors; the policy of
//! what to do with a failure (log-and-continue vs. fail the build)
//! belongs to the one caller at the top, not to the steps.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::appcfg::{write_artifact_cfg, ARTIFACT_CFG_NAME};
use crate::archive::{create_archive, write_checksum_sidecar};
use crate::assets::{AssetProvider, LAUNCHER_NAME};
use crate::extra::{merge_extra_files, MergeOutcome, EXTRA_BIN_SOURCE, EXTRA_CONF_SOURCE};
use crate::layout::DistribLayout;
use crate::project::ProjectDescriptor;
use crate::registrar::ArtifactRegistrar;
use crate::scripts::write_launcher;

/// Artifact type under which the archive is registered.
pub const DISTRIB_TYPE: &str = "zip";

/// Default archive classifier.
pub const DEFAULT_CLASSIFIER: &str = "distrib";

/// Packager configuration.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Classifier suffix of the archive name and attachment.
    pub classifier: String,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            classifier: DEFAULT_CLASSIFIER.to_string(),
        }
    }
}

impl PackageOptions {
    pub fn with_classifier(classifier: impl Into<String>) -> Self {
        Self {
            classifier: classifier.into(),
        }
    }
}

/// Result of a packaging run.
#[derive(Debug, PartialEq, Eq)]
pub enum PackageOutcome {
    /// `pom` project: nothing to distribute, nothing written.
    Skipped,
    /// Distribution built and registered.
    Archived {
        /// Path of the produced zip in the build directory.
        archive: PathBuf,
    },
}

/// Build the distribution archive for one project.
///
/// Steps run in order and the first failure aborts the remainder. A
/// `pom` project short-circuits to [`PackageOutcome::Skipped`] without
/// touching the filesystem.
pub fn package(
    descriptor: &ProjectDescriptor,
    options: &PackageOptions,
    assets: &dyn AssetProvider,
    registrar: &mut dyn ArtifactRegistrar,
) -> Result<PackageOutcome> {
    descriptor.validate()?;

    if descriptor.is_pom() {
        println!(
            "[package] skip execute on {} project",
            descriptor.packaging
        );
        return Ok(PackageOutcome::Skipped);
    }

    let layout = DistribLayout::for_build_dir(&descriptor.build_dir);
    layout.provision()?;

    write_launcher(assets, &layout.bin_dir)?;
    println!(
        "[package] create \"{}\" in {}",
        LAUNCHER_NAME,
        layout.bin_dir.display()
    );

    write_artifact_cfg(descriptor, &layout.conf_dir)?;
    println!(
        "[package] create \"{}\" in {}",
        ARTIFACT_CFG_NAME,
        layout.conf_dir.display()
    );

    merge_extras(descriptor, &layout)?;

    copy_primary_artifact(descriptor, &layout)?;

    let archive_name = descriptor.archive_file_name(&options.classifier);
    let archive = create_archive(
        &descriptor.build_dir,
        &archive_name,
        &layout.archived_dirs(),
    )?;
    println!(
        "[package] create \"{}\" in {}",
        archive_name,
        descriptor.build_dir.display()
    );
    write_checksum_sidecar(&archive)?;

    registrar
        .attach(&archive, DISTRIB_TYPE, &options.classifier)
        .with_context(|| format!("attaching archive '{}'", archive.display()))?;
    println!(
        "[package] attach \"{}\" ({})",
        archive_name, options.classifier
    );

    Ok(PackageOutcome::Archived { archive })
}

fn merge_extras(descriptor: &ProjectDescriptor, layout: &DistribLayout) -> Result<()> {
    let pairs = [
        (EXTRA_BIN_SOURCE, &layout.bin_dir),
        (EXTRA_CONF_SOURCE, &layout.conf_dir),
    ];
    for (source_rel, target) in pairs {
        let source = descriptor.base_dir.join(source_rel);
        match merge_extra_files(&source, target)? {
            MergeOutcome::SourceMissing => {}
            MergeOutcome::Merged(entries) => {
                println!(
                    "[package] add the \"{}\" file(s) in {}",
                    source.display(),
                    target.display()
                );
                println!("[package] the \"{}\" contains:", target.display());
                for entry in entries {
                    println!("  - {entry}");
                }
            }
        }
    }
    Ok(())
}

fn copy_primary_artifact(descriptor: &ProjectDescriptor, layout: &DistribLayout) -> Result<()> {
    let source = descriptor.primary_artifact_path();
    if !source.is_file() {
        bail!(
            "missing primary artifact '{}'; build the project before packaging",
            source.display()
        );
    }
    let dest = layout.app_dir.join(descriptor.primary_artifact_file_name());
    fs::copy(&source, &dest).with_context(|| {
        format!(
            "copying primary artifact '{}' to '{}'",
            source.display(),
            dest.display()
        )
    })?;
    println!(
        "[package] copy \"{}\" to {}",
        descriptor.primary_artifact_file_name(),
        layout.app_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::EmbeddedAssets;
    use crate::registrar::RecordingRegistrar;
    use std::collections::BTreeSet;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn demo_project(temp: &TempDir) -> ProjectDescriptor {
        let build_dir = temp.path().join("target");
        fs::create_dir_all(&build_dir).unwrap();
        fs::write(build_dir.join("demo-1.0.0.jar"), b"jar bytes").unwrap();
        ProjectDescriptor {
            artifact_id: "demo".to_string(),
            version: "1.0.0".to_string(),
            packaging: "jar".to_string(),
            build_dir,
            base_dir: temp.path().to_path_buf(),
            final_name: "demo-1.0.0".to_string(),
        }
    }

    fn run(descriptor: &ProjectDescriptor) -> (Result<PackageOutcome>, RecordingRegistrar) {
        let mut registrar = RecordingRegistrar::default();
        let outcome = package(
            descriptor,
            &PackageOptions::default(),
            &EmbeddedAssets,
            &mut registrar,
        );
        (outcome, registrar)
    }

    fn archive_names(archive: &std::path::Path) -> BTreeSet<String> {
        let mut zip = ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn packages_a_jar_project_end_to_end() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);

        let (outcome, registrar) = run(&descriptor);
        let PackageOutcome::Archived { archive } = outcome.unwrap() else {
            panic!("expected an archive");
        };

        assert_eq!(
            archive,
            temp.path().join("target/demo-1.0.0-distrib.zip")
        );
        let names = archive_names(&archive);
        assert!(names.contains("bin/app.sh"));
        assert!(names.contains("app/demo-1.0.0.jar"));
        assert!(names.contains("conf/artifact.cfg"));
        assert!(!names.iter().any(|n| n.starts_with("lib")));

        assert_eq!(registrar.attachments.len(), 1);
        assert_eq!(registrar.attachments[0].artifact_type, "zip");
        assert_eq!(registrar.attachments[0].classifier, "distrib");
        assert!(temp
            .path()
            .join("target/demo-1.0.0-distrib.sha256")
            .is_file());
    }

    #[test]
    fn archived_cfg_has_exact_content() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);

        let (outcome, _) = run(&descriptor);
        let PackageOutcome::Archived { archive } = outcome.unwrap() else {
            panic!("expected an archive");
        };

        let mut zip = ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let mut entry = zip.by_name("conf/artifact.cfg").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(
            content,
            "APP_ARTIFACT=demo\nAPP_PACKAGING=jar\nAPP_VERSION=1.0.0"
        );
    }

    #[test]
    fn archived_launcher_matches_normalized_template() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);

        let (outcome, _) = run(&descriptor);
        let PackageOutcome::Archived { archive } = outcome.unwrap() else {
            panic!("expected an archive");
        };

        let mut zip = ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let mut entry = zip.by_name("bin/app.sh").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();

        let mut expected = String::new();
        for line in include_str!("../assets/app.sh").lines() {
            expected.push_str(line);
            expected.push('\n');
        }
        assert_eq!(content, expected);
    }

    #[test]
    fn pom_project_is_skipped_without_writes() {
        let temp = TempDir::new().unwrap();
        let mut descriptor = demo_project(&temp);
        descriptor.packaging = "pom".to_string();

        let (outcome, registrar) = run(&descriptor);

        assert_eq!(outcome.unwrap(), PackageOutcome::Skipped);
        assert!(registrar.attachments.is_empty());
        assert!(!descriptor.build_dir.join("distrib").exists());
    }

    #[test]
    fn extra_bin_files_land_next_to_launcher() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);
        let extra_bin = temp.path().join("src/main/bin");
        fs::create_dir_all(&extra_bin).unwrap();
        fs::write(extra_bin.join("admin.sh"), "#!/bin/sh\n").unwrap();
        fs::write(extra_bin.join("debug.sh"), "#!/bin/sh\n").unwrap();

        let (outcome, _) = run(&descriptor);
        let PackageOutcome::Archived { archive } = outcome.unwrap() else {
            panic!("expected an archive");
        };

        let names = archive_names(&archive);
        assert!(names.contains("bin/app.sh"));
        assert!(names.contains("bin/admin.sh"));
        assert!(names.contains("bin/debug.sh"));
    }

    #[test]
    fn missing_artifact_fails_then_retry_succeeds() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);
        fs::remove_file(descriptor.primary_artifact_path()).unwrap();

        let (outcome, registrar) = run(&descriptor);
        assert!(outcome.is_err());
        assert!(registrar.attachments.is_empty());
        assert!(!descriptor
            .build_dir
            .join("demo-1.0.0-distrib.zip")
            .exists());

        // Place the artifact and retry.
        fs::write(descriptor.primary_artifact_path(), b"jar bytes").unwrap();
        let (outcome, _) = run(&descriptor);
        assert!(matches!(
            outcome.unwrap(),
            PackageOutcome::Archived { .. }
        ));
    }

    #[test]
    fn rerunning_overwrites_previous_archive() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);

        let (first, _) = run(&descriptor);
        first.unwrap();
        let (second, _) = run(&descriptor);
        let PackageOutcome::Archived { archive } = second.unwrap() else {
            panic!("expected an archive");
        };

        // Still a readable zip with the expected entries.
        assert!(archive_names(&archive).contains("app/demo-1.0.0.jar"));
    }

    #[test]
    fn custom_classifier_renames_archive_and_attachment() {
        let temp = TempDir::new().unwrap();
        let descriptor = demo_project(&temp);
        let mut registrar = RecordingRegistrar::default();

        let outcome = package(
            &descriptor,
            &PackageOptions::with_classifier("deploy"),
            &EmbeddedAssets,
            &mut registrar,
        )
        .unwrap();

        let PackageOutcome::Archived { archive } = outcome else {
            panic!("expected an archive");
        };
        assert_eq!(
            archive,
            temp.path().join("target/demo-1.0.0-deploy.zip")
        );
        assert_eq!(registrar.attachments[0].classifier, "deploy");
    }
}
