//! Archive access
//!
//! Archives are opened, read and modified entry by entry, then closed. Writes
//! are buffered on the handle and only reach the file system when the handle
//! is closed, so a handle that is dropped without closing leaves its file
//! exactly as it was.

use crate::{ArchiveStatus, Result, StoreError};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::result::{ZipError, ZipResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Generic archive capability used by document templates
pub trait ArchiveStore {
    /// An open archive
    type Handle;

    /// Open the archive at `path`
    fn open(&self, path: &Path) -> Result<Self::Handle>;

    /// Read a named entry, including writes that are still pending on the handle
    fn read_entry(&self, handle: &mut Self::Handle, name: &str) -> Result<Vec<u8>>;

    /// Replace (or add) a named entry
    fn write_entry(&self, handle: &mut Self::Handle, name: &str, contents: &[u8]) -> Result<()>;

    /// Flush pending writes and release the archive
    fn close(&self, handle: Self::Handle) -> Result<()>;
}

/// ZIP backed archive store
#[derive(Debug, Clone, Default)]
pub struct ZipStore {
    compression_level: Option<i64>,
}

impl ZipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate level used for rewritten entries
    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }
}

/// An open ZIP archive with buffered entry writes
pub struct ZipHandle {
    path: PathBuf,
    archive: ZipArchive<File>,
    pending: IndexMap<String, Vec<u8>>,
}

impl ZipHandle {
    /// Path of the archive this handle was opened on
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all entries, pending additions last
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.archive.file_names().map(str::to_string).collect();
        for name in self.pending.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl std::fmt::Debug for ZipHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipHandle")
            .field("path", &self.path)
            .field("entries", &self.archive.len())
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ArchiveStore for ZipStore {
    type Handle = ZipHandle;

    fn open(&self, path: &Path) -> Result<ZipHandle> {
        let open_error = |status| StoreError::ArchiveOpen {
            path: path.to_path_buf(),
            status,
        };

        let file = File::open(path).map_err(|e| open_error(ArchiveStatus::from_io_error(&e)))?;
        let archive = ZipArchive::new(file).map_err(|e| open_error(ArchiveStatus::from_zip_error(&e)))?;

        tracing::debug!("Opened archive {} with {} entries", path.display(), archive.len());

        Ok(ZipHandle {
            path: path.to_path_buf(),
            archive,
            pending: IndexMap::new(),
        })
    }

    fn read_entry(&self, handle: &mut ZipHandle, name: &str) -> Result<Vec<u8>> {
        if let Some(contents) = handle.pending.get(name) {
            return Ok(contents.clone());
        }

        let mut file = handle.archive.by_name(name).map_err(|e| {
            if matches!(e, ZipError::FileNotFound) {
                StoreError::MissingEntry(name.to_string())
            } else {
                StoreError::from(e)
            }
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    fn write_entry(&self, handle: &mut ZipHandle, name: &str, contents: &[u8]) -> Result<()> {
        handle.pending.insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    fn close(&self, handle: ZipHandle) -> Result<()> {
        let ZipHandle {
            path,
            mut archive,
            pending,
        } = handle;

        if pending.is_empty() {
            tracing::debug!("Closed archive {} without changes", path.display());
            return Ok(());
        }

        let close_error = |status| StoreError::ArchiveClose {
            path: path.clone(),
            status,
        };

        let dir = crate::parent_dir(&path);
        let mut rewritten = tempfile::Builder::new()
            .prefix(".docrender-")
            .suffix(".zip")
            .tempfile_in(&dir)
            .map_err(|_| close_error(ArchiveStatus::TmpOpen))?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.compression_level);

        rewrite_archive(&mut archive, pending, rewritten.as_file_mut(), options)
            .map_err(|e| close_error(ArchiveStatus::from_zip_error(&e)))?;

        crate::copy_permissions(&path, rewritten.path())
            .map_err(|_| close_error(ArchiveStatus::TmpOpen))?;

        // Release the source before replacing it
        drop(archive);

        rewritten
            .persist(&path)
            .map_err(|_| close_error(ArchiveStatus::Rename))?;

        tracing::debug!("Rewrote archive {}", path.display());
        Ok(())
    }
}

/// Copy every entry of `archive` into `out`, substituting pending contents
fn rewrite_archive<R, W>(
    archive: &mut ZipArchive<R>,
    mut pending: IndexMap<String, Vec<u8>>,
    out: W,
    options: SimpleFileOptions,
) -> ZipResult<()>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut writer = ZipWriter::new(out);

    for index in 0..archive.len() {
        let name = archive.by_index_raw(index)?.name().to_string();

        match pending.shift_remove(&name) {
            Some(contents) => {
                writer.start_file(name, options)?;
                writer.write_all(&contents)?;
            }
            None => {
                let entry = archive.by_index_raw(index)?;
                writer.raw_copy_file(entry)?;
            }
        }
    }

    for (name, contents) in pending {
        writer.start_file(name, options)?;
        writer.write_all(&contents)?;
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn read_back(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_read_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("word/document.xml", "<doc/>")]);

        let store = ZipStore::new();
        let mut handle = store.open(&path).unwrap();
        assert_eq!(store.read_entry(&mut handle, "word/document.xml").unwrap(), b"<doc/>");
        store.close(handle).unwrap();
    }

    #[test]
    fn test_missing_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("one.xml", "1")]);

        let store = ZipStore::new();
        let mut handle = store.open(&path).unwrap();
        let err = store.read_entry(&mut handle, "two.xml").unwrap_err();
        assert!(matches!(err, StoreError::MissingEntry(name) if name == "two.xml"));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.docx");
        std::fs::write(&path, "this is not a zip archive").unwrap();

        let err = ZipStore::new().open(&path).unwrap_err();
        match err {
            StoreError::ArchiveOpen { status, .. } => assert!(!status.is_ok()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_then_close_rewrites_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("keep.xml", "kept"), ("body.xml", "old"), ("tail.bin", "tail")]);

        let store = ZipStore::new();
        let mut handle = store.open(&path).unwrap();
        store.write_entry(&mut handle, "body.xml", b"new").unwrap();
        assert_eq!(store.read_entry(&mut handle, "body.xml").unwrap(), b"new");
        store.close(handle).unwrap();

        assert_eq!(read_back(&path, "body.xml"), "new");
        assert_eq!(read_back(&path, "keep.xml"), "kept");
        assert_eq!(read_back(&path, "tail.bin"), "tail");

        // Entry order is preserved
        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_write_new_entry_is_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("one.xml", "1")]);

        let store = ZipStore::new().with_compression_level(9);
        let mut handle = store.open(&path).unwrap();
        store.write_entry(&mut handle, "two.xml", b"2").unwrap();
        assert_eq!(handle.entry_names(), vec!["one.xml".to_string(), "two.xml".to_string()]);
        store.close(handle).unwrap();

        assert_eq!(read_back(&path, "one.xml"), "1");
        assert_eq!(read_back(&path, "two.xml"), "2");
    }

    #[cfg(unix)]
    #[test]
    fn test_close_keeps_archive_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("body.xml", "old")]);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let store = ZipStore::new();
        let mut handle = store.open(&path).unwrap();
        store.write_entry(&mut handle, "body.xml", b"new").unwrap();
        store.close(handle).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(read_back(&path, "body.xml"), "new");
    }

    #[test]
    fn test_drop_without_close_leaves_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_archive(&path, &[("body.xml", "old")]);
        let before = std::fs::read(&path).unwrap();

        let store = ZipStore::new();
        let mut handle = store.open(&path).unwrap();
        store.write_entry(&mut handle, "body.xml", b"new").unwrap();
        assert!(handle.has_pending_writes());
        drop(handle);

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_rewrite_archive_in_memory() {
        let mut source = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut source);
            zip.start_file("a.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"alpha").unwrap();
            zip.finish().unwrap();
        }

        let mut archive = ZipArchive::new(source).unwrap();
        let mut pending = IndexMap::new();
        pending.insert("a.txt".to_string(), b"beta".to_vec());

        let mut out = Cursor::new(Vec::new());
        rewrite_archive(&mut archive, pending, &mut out, SimpleFileOptions::default()).unwrap();

        let mut result = ZipArchive::new(out).unwrap();
        let mut contents = String::new();
        result.by_name("a.txt").unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "beta");
    }
}
