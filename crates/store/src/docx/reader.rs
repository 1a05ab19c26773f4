//! Reading parts back out of a DOCX package

use crate::{Result, StoreError};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Read access to the parts of a DOCX package
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Part contents as UTF-8 text
    pub fn read_file_as_string(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_file_as_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| StoreError::Xml(format!("{} is not valid UTF-8: {}", path, e)))
    }

    /// Raw part contents; `MissingEntry` if the part does not exist
    pub fn read_file_as_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                StoreError::MissingEntry(path.to_string())
            } else {
                StoreError::from(e)
            }
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Entry names in archive order
    pub fn file_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    /// Whether the content type table and main document part are present
    pub fn is_valid_docx(&self) -> bool {
        self.file_exists(crate::docx::CONTENT_TYPES_PART)
            && self.file_exists(crate::docx::MAIN_DOCUMENT_PART)
    }
}
