//! # HuffArc Archive
//!
//! The HuffArc archive format and the operations over it.
//!
//! An archive is a header of fixed-width records followed by one encoded
//! entry per file and a trailing 2-byte checksum of everything before it.
//! Every entry carries its own Huffman code table, so entries can be copied
//! between archives byte for byte.
//!
//! - [`layout`]: header records, entry trailers, header parsing
//! - [`codec`]: single-entry encoding and decoding
//! - [`manager`]: incremental compression with atomic replacement
//! - [`extract`]: decompression to the filesystem
//! - [`verify`]: archive and per-entry integrity, compression info
//!
//! ## Example
//!
//! ```rust,no_run
//! use huffarc_archive::{CompressOutcome, compress, decompress_all, is_corrupted};
//!
//! let outcome = compress(&["notes.txt", "data.bin"], "backup.harc").unwrap();
//! if let CompressOutcome::Written(report) = outcome {
//!     println!("{} entries", report.total_entries());
//! }
//! assert!(!is_corrupted("backup.harc").unwrap());
//! let files = decompress_all("backup.harc", "restored").unwrap();
//! println!("{} files restored", files.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod extract;
pub mod layout;
pub mod manager;
pub mod verify;

use std::path::{Path, PathBuf};

// Re-exports
pub use config::{ARCHIVE_EXTENSION, CodecConfig, MAX_ENTRIES, MAX_NAME_LEN};
pub use extract::output_path;
pub use huffarc_core::error::{HuffArcError, Result};
pub use layout::{ArchiveIndex, EntryTrailer, FileRecord, HeaderLayout};
pub use manager::{ArchiveManager, BuildReport, CompressOutcome, EntryStatus, PlannedEntry};
pub use verify::{ArchiveChecksum, DamageReport, EntryInfo, average_percent};

/// Compress `sources` into `archive` with the standard configuration.
pub fn compress<P: AsRef<Path>>(sources: &[P], archive: impl AsRef<Path>) -> Result<CompressOutcome> {
    ArchiveManager::new().compress(sources, archive)
}

/// Decompress every entry of `archive` under `dest`.
pub fn decompress_all(archive: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    ArchiveManager::new().decompress_all(archive, dest)
}

/// Decompress the entries of `archive` accepted by `select` under `dest`.
pub fn decompress_matching<F>(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    select: F,
) -> Result<Vec<PathBuf>>
where
    F: FnMut(&FileRecord) -> bool,
{
    ArchiveManager::new().decompress_matching(archive, dest, select)
}

/// Whether the whole-archive checksum of `archive` fails.
pub fn is_corrupted(archive: impl AsRef<Path>) -> Result<bool> {
    ArchiveManager::new().is_corrupted(archive)
}

/// Per-entry damage status of `archive`.
pub fn list_damaged(archive: impl AsRef<Path>) -> Result<Vec<DamageReport>> {
    ArchiveManager::new().list_damaged(archive)
}

/// Per-entry compression info of `archive`.
pub fn info(archive: impl AsRef<Path>) -> Result<Vec<EntryInfo>> {
    ArchiveManager::new().info(archive)
}
