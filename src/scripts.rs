//! Launcher script materialization into `bin/`.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::assets::{AssetProvider, LAUNCHER_NAME};

/// Write the bundled launcher template to `<bin_dir>/app.sh`.
///
/// The template is streamed line by line with a `\n` appended after every
/// line, so CRLF templates come out LF-only. Any prior launcher is
/// truncated. The script is marked executable since it is run directly
/// from the unpacked distribution.
pub fn write_launcher(assets: &dyn AssetProvider, bin_dir: &Path) -> Result<PathBuf> {
    let template = assets.launcher_template()?;
    let dest = bin_dir.join(LAUNCHER_NAME);

    let mut output = fs::File::create(&dest)
        .with_context(|| format!("creating launcher script '{}'", dest.display()))?;
    for line in template.lines() {
        output
            .write_all(line.as_bytes())
            .and_then(|()| output.write_all(b"\n"))
            .with_context(|| format!("writing launcher script '{}'", dest.display()))?;
    }
    drop(output);

    let mut perms = fs::metadata(&dest)
        .with_context(|| format!("reading metadata '{}'", dest.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&dest, perms)
        .with_context(|| format!("setting permissions '{}'", dest.display()))?;

    Ok(dest)
}
