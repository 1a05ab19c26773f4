//! Archive status codes
//!
//! Numbering follows the libzip `ZIP_ER_*` table so that codes reported here
//! line up with what other zip tooling prints for the same failure.

use std::fmt;

/// Outcome of an archive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveStatus {
    Ok,
    MultiDisk,
    Rename,
    Close,
    Seek,
    Read,
    Write,
    Crc,
    ZipClosed,
    NoEntry,
    Exists,
    Open,
    TmpOpen,
    Zlib,
    Memory,
    Changed,
    CompressionNotSupported,
    Eof,
    Invalid,
    NotZip,
    Internal,
    Inconsistent,
    Remove,
    Deleted,
}

impl ArchiveStatus {
    /// Numeric status code, 0 on success
    pub fn code(&self) -> u8 {
        match self {
            ArchiveStatus::Ok => 0,
            ArchiveStatus::MultiDisk => 1,
            ArchiveStatus::Rename => 2,
            ArchiveStatus::Close => 3,
            ArchiveStatus::Seek => 4,
            ArchiveStatus::Read => 5,
            ArchiveStatus::Write => 6,
            ArchiveStatus::Crc => 7,
            ArchiveStatus::ZipClosed => 8,
            ArchiveStatus::NoEntry => 9,
            ArchiveStatus::Exists => 10,
            ArchiveStatus::Open => 11,
            ArchiveStatus::TmpOpen => 12,
            ArchiveStatus::Zlib => 13,
            ArchiveStatus::Memory => 14,
            ArchiveStatus::Changed => 15,
            ArchiveStatus::CompressionNotSupported => 16,
            ArchiveStatus::Eof => 17,
            ArchiveStatus::Invalid => 18,
            ArchiveStatus::NotZip => 19,
            ArchiveStatus::Internal => 20,
            ArchiveStatus::Inconsistent => 21,
            ArchiveStatus::Remove => 22,
            ArchiveStatus::Deleted => 23,
        }
    }

    /// Human readable message for the status
    pub fn message(&self) -> &'static str {
        match self {
            ArchiveStatus::Ok => "No error",
            ArchiveStatus::MultiDisk => "Multi-disk zip archives not supported",
            ArchiveStatus::Rename => "Renaming temporary file failed",
            ArchiveStatus::Close => "Closing zip archive failed",
            ArchiveStatus::Seek => "Seek error",
            ArchiveStatus::Read => "Read error",
            ArchiveStatus::Write => "Write error",
            ArchiveStatus::Crc => "CRC error",
            ArchiveStatus::ZipClosed => "Containing zip archive was closed",
            ArchiveStatus::NoEntry => "No such file",
            ArchiveStatus::Exists => "File already exists",
            ArchiveStatus::Open => "Can't open file",
            ArchiveStatus::TmpOpen => "Failure to create temporary file",
            ArchiveStatus::Zlib => "Zlib error",
            ArchiveStatus::Memory => "Malloc failure",
            ArchiveStatus::Changed => "Entry has been changed",
            ArchiveStatus::CompressionNotSupported => "Compression method not supported",
            ArchiveStatus::Eof => "Premature end of file",
            ArchiveStatus::Invalid => "Invalid argument",
            ArchiveStatus::NotZip => "Not a zip archive",
            ArchiveStatus::Internal => "Internal error",
            ArchiveStatus::Inconsistent => "Zip archive inconsistent",
            ArchiveStatus::Remove => "Can't remove file",
            ArchiveStatus::Deleted => "Entry has been deleted",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ArchiveStatus::Ok)
    }

    /// Status that best describes an error reported by the zip library
    pub fn from_zip_error(err: &zip::result::ZipError) -> Self {
        use zip::result::ZipError;
        match err {
            ZipError::Io(io) => Self::from_io_error(io),
            ZipError::InvalidArchive(_) => ArchiveStatus::NotZip,
            ZipError::UnsupportedArchive(_) => ArchiveStatus::CompressionNotSupported,
            ZipError::FileNotFound => ArchiveStatus::NoEntry,
            _ => ArchiveStatus::Internal,
        }
    }

    /// Status for a plain I/O failure during an archive operation
    pub fn from_io_error(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => ArchiveStatus::NoEntry,
            ErrorKind::UnexpectedEof => ArchiveStatus::Eof,
            ErrorKind::OutOfMemory => ArchiveStatus::Memory,
            ErrorKind::AlreadyExists => ArchiveStatus::Exists,
            ErrorKind::InvalidInput | ErrorKind::InvalidData => ArchiveStatus::Invalid,
            ErrorKind::PermissionDenied => ArchiveStatus::Open,
            ErrorKind::WriteZero => ArchiveStatus::Write,
            _ => ArchiveStatus::Read,
        }
    }
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message(), self.code())
    }
}
