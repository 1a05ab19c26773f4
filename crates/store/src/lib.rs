//! Store - Archive access, working copies, and DOCX package I/O
//!
//! This crate handles the storage side of document rendering: opening
//! archives and rewriting individual entries, creating private working copies
//! and staged output files, translating archive failures into status codes,
//! and writing or reading minimal DOCX packages.

mod archive;
mod error;
mod file_io;
mod status;
pub mod docx;

pub use archive::{ArchiveStore, ZipHandle, ZipStore};
pub use error::*;
pub use file_io::*;
pub use status::ArchiveStatus;

// Re-export DOCX functionality
pub use docx::{DocxReader, DocxWriter, MAIN_DOCUMENT_PART};
