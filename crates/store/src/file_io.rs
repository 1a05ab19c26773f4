//! File system helpers for working copies and staged output
//!
//! Every file produced here is created next to where it will eventually live,
//! so moving it into place is a same-filesystem rename.

use crate::{Result, StoreError};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};

/// Directory that contains `path`, `.` for bare file names
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Fail with `InvalidPath` unless `path` is a readable regular file
pub fn ensure_readable(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(StoreError::InvalidPath(path.to_path_buf()));
    }

    File::open(path).map_err(|_| StoreError::InvalidPath(path.to_path_buf()))?;
    Ok(())
}

/// Fail with `InvalidPath` unless the directory that would hold `path` exists
pub fn ensure_parent_dir(path: &Path) -> Result<PathBuf> {
    let dir = parent_dir(path);
    if !dir.is_dir() {
        return Err(StoreError::InvalidPath(dir));
    }
    Ok(dir)
}

fn temp_builder_parts(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (format!("{stem}-"), suffix)
}

/// Create an empty, uniquely named file in `dir` named after `like`
///
/// The name keeps the base name and extension of `like` and adds a random
/// suffix, so concurrent callers never collide.
pub fn named_temp_in(dir: &Path, like: &Path) -> Result<NamedTempFile> {
    let (prefix, suffix) = temp_builder_parts(like);
    let file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file)
}

/// Create a uniquely named output file in `dir` that will replace `destination`
///
/// The file is created with the mode a plain `File::create` would give it
/// (`0666` minus the umask). If `destination` already exists its permissions
/// are copied instead, so persisting the file does not change them.
pub fn output_temp_in(dir: &Path, destination: &Path) -> Result<NamedTempFile> {
    let (prefix, suffix) = temp_builder_parts(destination);
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(&suffix);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let file = builder.tempfile_in(dir)?;
    copy_permissions(destination, file.path())?;
    Ok(file)
}

/// Give `target` the permissions of `reference`; no-op if `reference` is missing
pub fn copy_permissions(reference: &Path, target: &Path) -> Result<()> {
    match std::fs::metadata(reference) {
        Ok(metadata) => std::fs::set_permissions(target, metadata.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Copy `source` into a private temporary file
///
/// The copy lands in `temp_dir`, or the system temp directory when none is
/// given. If copying fails the partially written file is removed.
pub fn create_working_copy(source: &Path, temp_dir: Option<&Path>) -> Result<TempPath> {
    ensure_readable(source)?;

    let dir = temp_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    let mut copy = named_temp_in(&dir, source)?;

    let mut input = File::open(source).map_err(|_| StoreError::InvalidPath(source.to_path_buf()))?;
    std::io::copy(&mut input, copy.as_file_mut())?;
    copy.as_file().sync_all()?;

    let working = copy.into_temp_path();
    tracing::debug!(
        "Copied {} to working copy {}",
        source.display(),
        working.display()
    );
    Ok(working)
}

/// Copy `source` into a fresh temporary file placed next to `destination`
pub fn stage_beside(source: &Path, destination: &Path) -> Result<TempPath> {
    let dir = ensure_parent_dir(destination)?;
    let mut staged = output_temp_in(&dir, destination)?;

    let mut input = File::open(source)?;
    std::io::copy(&mut input, staged.as_file_mut())?;

    Ok(staged.into_temp_path())
}

/// Move a temporary file onto `destination`, replacing what is there
pub fn persist_to(temp: TempPath, destination: &Path) -> Result<()> {
    let from = temp.to_path_buf();
    temp.persist(destination).map_err(|e| StoreError::Relocate {
        from,
        to: destination.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
