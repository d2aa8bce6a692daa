//! Merge of user-supplied extra files into the staging tree.
//!
//! Projects may carry `src/main/bin` and `src/main/conf` directories;
//! their contents are merged into the staged `bin/` and `conf/` dirs.
//! A missing source directory is not an error.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Conventional extra-file source directories, relative to the project
/// base dir, paired with the layout directory they merge into.
pub const EXTRA_BIN_SOURCE: &str = "src/main/bin";
pub const EXTRA_CONF_SOURCE: &str = "src/main/conf";

/// Outcome of one extra-file merge.
#[derive(Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Source directory absent; nothing copied.
    SourceMissing,
    /// Source copied; holds the sorted top-level entries now present in
    /// the target directory (for progress reporting).
    Merged(Vec<String>),
}

/// Recursively merge `source` into `target`.
///
/// Files overwrite same-named targets, relative structure is preserved,
/// symlinks are preserved rather than followed, and regular files keep
/// their source modification time.
pub fn merge_extra_files(source: &Path, target: &Path) -> Result<MergeOutcome> {
    if !source.exists() {
        return Ok(MergeOutcome::SourceMissing);
    }
    copy_dir_recursive(source, target)?;
    Ok(MergeOutcome::Merged(top_level_entries(target)?))
}

/// Recursively copy a directory tree, overwriting existing files.
///
/// Unlike `fs::copy` alone, this handles nested directories and preserves
/// symlinks and file modification times.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)
            .with_context(|| format!("creating directory '{}'", dst.display()))?;
    }

    for entry in
        fs::read_dir(src).with_context(|| format!("reading directory '{}'", src.display()))?
    {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            let link_target = fs::read_link(&src_path)?;
            if dst_path.exists() || dst_path.is_symlink() {
                fs::remove_file(&dst_path)?;
            }
            std::os::unix::fs::symlink(&link_target, &dst_path)
                .with_context(|| format!("creating symlink '{}'", dst_path.display()))?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .with_context(|| format!("copying file '{}'", src_path.display()))?;
            preserve_mtime(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

fn preserve_mtime(src: &Path, dst: &Path) -> Result<()> {
    let modified = fs::metadata(src)
        .with_context(|| format!("reading metadata '{}'", src.display()))?
        .modified()
        .with_context(|| format!("reading mtime '{}'", src.display()))?;
    let dest_file = fs::File::options()
        .write(true)
        .open(dst)
        .with_context(|| format!("opening '{}' to set mtime", dst.display()))?;
    dest_file
        .set_modified(modified)
        .with_context(|| format!("setting mtime '{}'", dst.display()))?;
    Ok(())
}

/// Sorted names of the top-level entries in a directory.
pub fn top_level_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading directory '{}'", dir.display()))?
    {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_source_is_skipped() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("bin");
        fs::create_dir_all(&target).unwrap();

        let outcome = merge_extra_files(&temp.path().join("absent"), &target).unwrap();

        assert_eq!(outcome, MergeOutcome::SourceMissing);
        assert!(top_level_entries(&target).unwrap().is_empty());
    }

    #[test]
    fn merge_copies_nested_structure() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/main/conf");
        fs::create_dir_all(source.join("env")).unwrap();
        fs::write(source.join("log.properties"), "level=info\n").unwrap();
        fs::write(source.join("env/prod.cfg"), "PORT=8080\n").unwrap();
        let target = temp.path().join("conf");
        fs::create_dir_all(&target).unwrap();

        let outcome = merge_extra_files(&source, &target).unwrap();

        assert_eq!(
            outcome,
            MergeOutcome::Merged(vec!["env".to_string(), "log.properties".to_string()])
        );
        assert_eq!(
            fs::read_to_string(target.join("env/prod.cfg")).unwrap(),
            "PORT=8080\n"
        );
    }

    #[test]
    fn merge_overwrites_same_named_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extra");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("app.sh"), "project launcher\n").unwrap();
        let target = temp.path().join("bin");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("app.sh"), "bundled launcher\n").unwrap();

        merge_extra_files(&source, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("app.sh")).unwrap(),
            "project launcher\n"
        );
    }

    #[test]
    fn merge_preserves_modification_time() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extra");
        fs::create_dir_all(&source).unwrap();
        let src_file = source.join("tool.sh");
        fs::write(&src_file, "echo tool\n").unwrap();
        let src_mtime = fs::metadata(&src_file).unwrap().modified().unwrap();

        let target = temp.path().join("bin");
        fs::create_dir_all(&target).unwrap();
        merge_extra_files(&source, &target).unwrap();

        let dst_mtime = fs::metadata(target.join("tool.sh"))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(dst_mtime, src_mtime);
    }

    #[test]
    fn top_level_entries_are_sorted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b"), "").unwrap();
        fs::write(temp.path().join("a"), "").unwrap();
        fs::create_dir(temp.path().join("c")).unwrap();

        assert_eq!(top_level_entries(temp.path()).unwrap(), vec!["a", "b", "c"]);
    }
}
