//! Integrity checks and per-entry information.
//!
//! The last two bytes of an archive hold the sum of every byte before them.
//! Each entry additionally stores the sum of its own bytes in its last two
//! bytes, so damage can be narrowed down to individual entries.

use crate::layout::{ArchiveIndex, FileRecord};
use crate::manager::ArchiveManager;
use huffarc_core::buffer::ByteReader;
use huffarc_core::checksum::checksum_range;
use huffarc_core::error::Result;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Damage status of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageReport {
    /// Entry name.
    pub name: String,
    /// Whether the entry's bytes disagree with its stored checksum, or its
    /// extent does not fit in the archive.
    pub damaged: bool,
    /// Checksum stored in the entry, if the extent is readable.
    pub stored: Option<u16>,
    /// Checksum computed over the entry, if the extent is readable.
    pub computed: Option<u16>,
}

/// Compression information of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry name.
    pub name: String,
    /// Stored compression percentage. Negative when the entry grew.
    pub percent: i8,
    /// Size of the entry in the archive.
    pub compressed_len: u64,
}

/// Stored and recomputed whole-archive checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveChecksum {
    /// Value in the last two bytes.
    pub stored: u16,
    /// Sum of every byte before them.
    pub computed: u16,
}

impl ArchiveChecksum {
    /// Whether the two values agree.
    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

/// Integer mean of the stored percentages, or `None` for no entries.
pub fn average_percent(entries: &[EntryInfo]) -> Option<i64> {
    if entries.is_empty() {
        return None;
    }
    let total: i64 = entries.iter().map(|entry| entry.percent as i64).sum();
    Some(total / entries.len() as i64)
}

impl ArchiveManager {
    /// Read the whole-archive checksum pair. `None` when the archive is
    /// shorter than the checksum itself.
    pub fn archive_checksum(&self, archive: impl AsRef<Path>) -> Result<Option<ArchiveChecksum>> {
        let file = File::open(archive)?;
        let len = file.metadata()?.len();
        if len < 2 {
            return Ok(None);
        }
        let mut reader = ByteReader::with_capacity(self.config().buffer_capacity, file);
        let computed = checksum_range(&mut reader, 0, Some(len - 2))?;
        reader.seek(len - 2)?;
        let stored = reader.read_u16_le()?;
        Ok(Some(ArchiveChecksum { stored, computed }))
    }

    /// Whether the whole-archive checksum fails.
    pub fn is_corrupted(&self, archive: impl AsRef<Path>) -> Result<bool> {
        Ok(!self
            .archive_checksum(archive)?
            .is_some_and(|checksum| checksum.is_valid()))
    }

    /// Check every entry against its own checksum.
    ///
    /// One report is returned per record, damaged or not.
    pub fn list_damaged(&self, archive: impl AsRef<Path>) -> Result<Vec<DamageReport>> {
        let archive = archive.as_ref();
        let index = ArchiveIndex::open_with_config(archive, self.config())?;
        let mut reader =
            ByteReader::with_capacity(self.config().buffer_capacity, File::open(archive)?);
        index
            .records()
            .iter()
            .map(|record| entry_damage(&mut reader, &index, record))
            .collect()
    }

    /// Stored compression percentage of every entry.
    pub fn info(&self, archive: impl AsRef<Path>) -> Result<Vec<EntryInfo>> {
        let archive = archive.as_ref();
        let index = ArchiveIndex::open_with_config(archive, self.config())?;
        let mut reader =
            ByteReader::with_capacity(self.config().buffer_capacity, File::open(archive)?);
        index
            .records()
            .iter()
            .map(|record| {
                let trailer = index.read_trailer(&mut reader, record)?;
                Ok(EntryInfo {
                    name: record.name.clone(),
                    percent: trailer.percent,
                    compressed_len: record.compressed_len(),
                })
            })
            .collect()
    }
}

fn entry_damage<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    index: &ArchiveIndex,
    record: &FileRecord,
) -> Result<DamageReport> {
    if !record.fits(index.archive_len()) {
        return Ok(DamageReport {
            name: record.name.clone(),
            damaged: true,
            stored: None,
            computed: None,
        });
    }
    let checksum_at = record.end as u64 - 2;
    let computed = checksum_range(reader, record.start as u64, Some(checksum_at))?;
    reader.seek(checksum_at)?;
    let stored = reader.read_u16_le()?;
    Ok(DamageReport {
        name: record.name.clone(),
        damaged: stored != computed,
        stored: Some(stored),
        computed: Some(computed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, percent: i8) -> EntryInfo {
        EntryInfo {
            name: name.to_string(),
            percent,
            compressed_len: 0,
        }
    }

    #[test]
    fn test_average_percent() {
        assert_eq!(average_percent(&[]), None);
        assert_eq!(average_percent(&[info("a", 40), info("b", 45)]), Some(42));
        assert_eq!(average_percent(&[info("a", -10), info("b", 3)]), Some(-3));
    }

    #[test]
    fn test_short_archive_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.harc");
        std::fs::write(&path, [7u8]).unwrap();
        let manager = ArchiveManager::new();
        assert!(manager.is_corrupted(&path).unwrap());
        assert_eq!(manager.archive_checksum(&path).unwrap(), None);
    }

    #[test]
    fn test_checksum_trailer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.harc");
        std::fs::write(&path, [1u8, 2, 3, 6, 0]).unwrap();
        let manager = ArchiveManager::new();
        assert!(!manager.is_corrupted(&path).unwrap());

        std::fs::write(&path, [1u8, 2, 4, 6, 0]).unwrap();
        assert!(manager.is_corrupted(&path).unwrap());
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new();
        let err = manager.is_corrupted(dir.path().join("none.harc")).unwrap_err();
        assert!(!err.is_format_violation());
        assert!(manager.info(dir.path().join("none.harc")).is_err());
    }
}
