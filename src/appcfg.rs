//! Generated `conf/artifact.cfg`.
//!
//! Three KEY=VALUE lines sourced by the launcher at startup. The third
//! line carries no trailing newline; downstream scripts `source` this file
//! and the byte layout is kept exactly as the existing distributions
//! expect it.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::project::ProjectDescriptor;

/// File name of the generated config inside `conf/`.
pub const ARTIFACT_CFG_NAME: &str = "artifact.cfg";

/// Write `<conf_dir>/artifact.cfg` from the project descriptor,
/// truncating any prior content.
pub fn write_artifact_cfg(descriptor: &ProjectDescriptor, conf_dir: &Path) -> Result<PathBuf> {
    let dest = conf_dir.join(ARTIFACT_CFG_NAME);
    let mut output = fs::File::create(&dest)
        .with_context(|| format!("creating config file '{}'", dest.display()))?;
    write!(
        output,
        "APP_ARTIFACT={}\nAPP_PACKAGING={}\nAPP_VERSION={}",
        descriptor.artifact_id, descriptor.packaging, descriptor.version
    )
    .with_context(|| format!("writing config file '{}'", dest.display()))?;
    Ok(dest)
}
