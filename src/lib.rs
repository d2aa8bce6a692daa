//! Distribution packager for built application artifacts.
//!
//! Takes a project's primary build output (jar/war/ear) and assembles a
//! deployable zip with the conventional layout:
//!
//! ```text
//! <build_dir>/distrib/
//!     bin/   launcher script + project bin files
//!     conf/  generated artifact.cfg + project conf files
//!     app/   the primary artifact
//!     lib/   reserved, stays empty and out of the archive
//! ```
//!
//! The staged `bin`, `app` and `conf` directories are zipped into
//! `<artifact_id>-<version>-<classifier>.zip` in the build directory and
//! the archive is registered as an attached artifact of type `zip`.
//!
//! # Example
//!
//! ```rust,ignore
//! use distrib_packager::{package, EmbeddedAssets, PackageOptions};
//! use distrib_packager::registrar::ManifestRegistrar;
//!
//! let mut registrar = ManifestRegistrar::for_build_dir(&descriptor.build_dir);
//! package(&descriptor, &PackageOptions::default(), &EmbeddedAssets, &mut registrar)?;
//! ```
//!
//! A `pom` project produces no binary artifact and is skipped cleanly.
//! All steps return `Result`; the single place that decides whether a
//! packaging failure stops the build is the caller (see the CLI).

pub mod appcfg;
pub mod archive;
pub mod assets;
pub mod extra;
pub mod layout;
pub mod packager;
pub mod project;
pub mod registrar;
pub mod scripts;

pub use assets::{AssetProvider, EmbeddedAssets};
pub use layout::DistribLayout;
pub use packager::{package, PackageOptions, PackageOutcome, DEFAULT_CLASSIFIER, DISTRIB_TYPE};
pub use project::ProjectDescriptor;
pub use registrar::{ArtifactRegistrar, ManifestRegistrar};
