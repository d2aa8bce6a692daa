//! Distribution output layout under `<build_dir>/distrib`.
//!
//! Four fixed subdirectories: `lib`, `app`, `conf`, `bin`. All four are
//! provisioned before any file write. `lib` stays empty (reserved for
//! dependency jars) and is excluded from the archive.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the distribution staging directory inside the build dir.
pub const DISTRIB_DIR: &str = "distrib";

/// Subdirectory names, in provisioning order.
pub const LIB_DIR: &str = "lib";
pub const APP_DIR: &str = "app";
pub const BIN_DIR: &str = "bin";
pub const CONF_DIR: &str = "conf";

/// Resolved paths of the distribution staging tree.
#[derive(Debug, Clone)]
pub struct DistribLayout {
    /// `<build_dir>/distrib`
    pub root: PathBuf,
    /// `<root>/lib` — created, never populated.
    pub lib_dir: PathBuf,
    /// `<root>/app` — receives the primary artifact.
    pub app_dir: PathBuf,
    /// `<root>/bin` — receives the launcher and extra bin files.
    pub bin_dir: PathBuf,
    /// `<root>/conf` — receives artifact.cfg and extra conf files.
    pub conf_dir: PathBuf,
}

impl DistribLayout {
    /// Compute the layout for a build directory. No filesystem access.
    pub fn for_build_dir(build_dir: &Path) -> Self {
        let root = build_dir.join(DISTRIB_DIR);
        Self {
            lib_dir: root.join(LIB_DIR),
            app_dir: root.join(APP_DIR),
            bin_dir: root.join(BIN_DIR),
            conf_dir: root.join(CONF_DIR),
            root,
        }
    }

    /// Create all four subdirectories. Pre-existing directories are left
    /// alone, so re-running the packager on a dirty build dir is fine.
    pub fn provision(&self) -> Result<()> {
        for dir in [&self.lib_dir, &self.app_dir, &self.bin_dir, &self.conf_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating distribution directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    /// The directories that go into the archive, in archive order.
    /// `lib` is deliberately absent.
    pub fn archived_dirs(&self) -> [&Path; 3] {
        [&self.bin_dir, &self.app_dir, &self.conf_dir]
    }
}
