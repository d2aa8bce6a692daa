//! Distribution archive creation.
//!
//! Produces the final zip in the build directory. Each staged directory
//! is added as a folder, so the archive's top level directly contains
//! `bin/…`, `app/…` and `conf/…`. A sha256 sidecar is written next to
//! the archive in the `sha256sum` text format.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufReader, Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Create `<build_dir>/<archive_name>` containing each of `dirs` as a
/// top-level folder, truncating any prior archive of the same name.
///
/// Directory entries are preserved and file permissions are carried into
/// the zip, so the launcher stays executable after extraction.
pub fn create_archive(build_dir: &Path, archive_name: &str, dirs: &[&Path]) -> Result<PathBuf> {
    let archive_path = build_dir.join(archive_name);
    let file = fs::File::create(&archive_path)
        .with_context(|| format!("creating archive '{}'", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);

    for dir in dirs {
        add_folder(&mut zip, dir)
            .with_context(|| format!("adding folder '{}' to archive", dir.display()))?;
    }

    zip.finish()
        .with_context(|| format!("finalizing archive '{}'", archive_path.display()))?;
    Ok(archive_path)
}

/// Add a directory as a top-level archive folder named after the
/// directory itself.
fn add_folder(zip: &mut ZipWriter<fs::File>, dir: &Path) -> Result<()> {
    let folder_name = dir
        .file_name()
        .with_context(|| format!("directory '{}' has no name", dir.display()))?
        .to_string_lossy()
        .into_owned();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking directory '{}'", dir.display()))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("stripping prefix '{}'", dir.display()))?;

        let mut name = folder_name.clone();
        for component in relative.components() {
            name.push('/');
            name.push_str(&component.as_os_str().to_string_lossy());
        }

        let mode = entry
            .metadata()
            .with_context(|| format!("reading metadata '{}'", entry.path().display()))?
            .permissions()
            .mode();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(mode & 0o777);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)
                .with_context(|| format!("adding directory entry '{name}'"))?;
        } else {
            let bytes = fs::read(entry.path())
                .with_context(|| format!("reading file '{}'", entry.path().display()))?;
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("starting archive entry '{name}'"))?;
            zip.write_all(&bytes)
                .with_context(|| format!("writing archive entry '{name}'"))?;
        }
    }

    Ok(())
}

/// Write a `.sha256` sidecar next to the archive.
///
/// Content is `"<hex>  <filename>\n"` (two spaces), the `sha256sum -c`
/// format. Returns the sidecar path.
pub fn write_checksum_sidecar(archive_path: &Path) -> Result<PathBuf> {
    let (hash, _) = sha256_file(archive_path)?;
    let filename = archive_path
        .file_name()
        .with_context(|| format!("archive '{}' has no file name", archive_path.display()))?
        .to_string_lossy();

    let sidecar = archive_path.with_extension("sha256");
    fs::write(&sidecar, format!("{hash}  {filename}\n"))
        .with_context(|| format!("writing checksum '{}'", sidecar.display()))?;
    Ok(sidecar)
}

fn sha256_file(path: &Path) -> Result<(String, u64)> {
    let file =
        fs::File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((format!("{:x}", hasher.finalize()), size))
}
