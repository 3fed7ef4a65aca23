//! Archive header layout.
//!
//! ```text
//! [2B file_count]['\n']
//! file_count times: [name]['\n'][4B start][' '][4B end]
//! ```
//!
//! Every record has a fixed width once its name is known, so the header is
//! written up front with zero offsets and patched in place as each entry is
//! finished. Patching never moves a byte.
//!
//! Each entry occupies `[start, end)` and ends with a 5-byte trailer:
//! the signed compression percentage, the checksum of the original file,
//! and the checksum of the entry's own bytes before that last field.

use crate::config::{CodecConfig, MAX_ENTRIES};
use huffarc_core::buffer::{ByteReader, ByteWriter};
use huffarc_core::error::{HuffArcError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Bytes of the per-entry trailer.
pub const TRAILER_LEN: u64 = 5;

/// Byte that follows the entry count and separates encoded entries.
pub const SEPARATOR: u8 = b'\n';

/// Byte between the start and end offsets of a record.
const OFFSET_GAP: u8 = b' ';

/// One header record: entry name and its byte extent in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Entry name, as given when the entry was compressed.
    pub name: String,
    /// Offset of the entry's first byte.
    pub start: u32,
    /// Offset one past the entry's last byte.
    pub end: u32,
}

impl FileRecord {
    /// Size of the entry in the archive.
    pub fn compressed_len(&self) -> u64 {
        (self.end as u64).saturating_sub(self.start as u64)
    }

    /// Whether `[start, end)` can hold a trailer and lies within `archive_len`.
    pub fn fits(&self, archive_len: u64) -> bool {
        self.start <= self.end
            && self.compressed_len() >= TRAILER_LEN
            && self.end as u64 <= archive_len
    }
}

/// The 5 bytes closing every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTrailer {
    /// `trunc(100 * (1 - compressed / original))`, wrapped to a signed byte.
    pub percent: i8,
    /// Checksum of the original file.
    pub original_checksum: u16,
    /// Checksum of `[start, end - 2)`.
    pub segment_checksum: u16,
}

/// Reject names the header cannot represent.
pub fn validate_name(name: &str, config: &CodecConfig) -> Result<()> {
    if name.is_empty() {
        return Err(HuffArcError::invalid_entry_name(name, "name is empty"));
    }
    if name.contains('\n') {
        return Err(HuffArcError::invalid_entry_name(name, "name contains a newline"));
    }
    if name.len() > config.max_name_len {
        return Err(HuffArcError::invalid_entry_name(
            name,
            "name exceeds the maximum length",
        ));
    }
    Ok(())
}

/// Header under construction.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    names: Vec<String>,
    /// Position of each record's start-offset field, known once written.
    offset_fields: Vec<u64>,
}

impl HeaderLayout {
    /// Create a layout for `names`, in archive order.
    pub fn new(names: Vec<String>, config: &CodecConfig) -> Result<Self> {
        if names.len() > MAX_ENTRIES {
            return Err(HuffArcError::too_many_entries(names.len(), MAX_ENTRIES));
        }
        for name in &names {
            validate_name(name, config)?;
        }
        Ok(Self {
            names,
            offset_fields: Vec::new(),
        })
    }

    /// Entry names in archive order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the layout has no records.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Size of the encoded header in bytes.
    pub fn encoded_len(&self) -> u64 {
        3 + self
            .names
            .iter()
            .map(|name| name.len() as u64 + 10)
            .sum::<u64>()
    }

    /// Write the header with zero offsets at the writer's position.
    pub fn write<W: Write + Seek>(&mut self, writer: &mut ByteWriter<W>) -> Result<()> {
        self.offset_fields.clear();
        writer.write_u16_le(self.names.len() as u16)?;
        writer.write_byte(SEPARATOR)?;
        for name in &self.names {
            writer.write_all(name.as_bytes())?;
            writer.write_byte(b'\n')?;
            self.offset_fields.push(writer.tell()?);
            writer.write_u32_le(0)?;
            writer.write_byte(OFFSET_GAP)?;
            writer.write_u32_le(0)?;
        }
        Ok(())
    }

    /// Overwrite the offsets of record `index` in place.
    pub fn patch_offsets<W: Write + Seek>(
        &self,
        writer: &mut ByteWriter<W>,
        index: usize,
        start: u64,
        end: u64,
    ) -> Result<()> {
        let field = *self.offset_fields.get(index).ok_or_else(|| {
            HuffArcError::invalid_header(format!("record {} has not been written", index))
        })?;
        let start = u32::try_from(start).map_err(|_| HuffArcError::offset_overflow(start))?;
        let end = u32::try_from(end).map_err(|_| HuffArcError::offset_overflow(end))?;
        writer.patch(field, &start.to_le_bytes())?;
        writer.patch(field + 5, &end.to_le_bytes())?;
        Ok(())
    }
}

/// Parsed archive header.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    records: Vec<FileRecord>,
    header_len: u64,
    archive_len: u64,
}

impl ArchiveIndex {
    /// Read the header of the archive at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &CodecConfig::STANDARD)
    }

    /// Read the header of the archive at `path` with explicit settings.
    pub fn open_with_config(path: impl AsRef<Path>, config: &CodecConfig) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = ByteReader::with_capacity(config.buffer_capacity, file);
        Self::read(&mut reader, config)
    }

    /// Read a header from the start of `reader`.
    pub fn read<R: Read + Seek>(reader: &mut ByteReader<R>, config: &CodecConfig) -> Result<Self> {
        let archive_len = reader.get_mut().seek(SeekFrom::End(0))?;
        reader.seek(0)?;

        let count = reader
            .read_u16_le()
            .map_err(|_| HuffArcError::invalid_header("archive too short for an entry count"))?;
        if reader.read_byte()? != Some(SEPARATOR) {
            return Err(HuffArcError::invalid_header("missing newline after entry count"));
        }

        let mut records = Vec::with_capacity(count as usize);
        for index in 0..count {
            let line = reader.read_line(config.max_name_len)?;
            let name = String::from_utf8(line).map_err(|_| {
                HuffArcError::invalid_header(format!("record {} name is not UTF-8", index))
            })?;
            let start = reader.read_u32_le()?;
            if reader.read_byte()? != Some(OFFSET_GAP) {
                return Err(HuffArcError::invalid_header(format!(
                    "record {} ({}) is missing its offset separator",
                    index, name
                )));
            }
            let end = reader.read_u32_le()?;
            records.push(FileRecord { name, start, end });
        }

        let header_len = reader.tell()?;
        Ok(Self {
            records,
            header_len,
            archive_len,
        })
    }

    /// Records in archive order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Find a record by exact name.
    pub fn find(&self, name: &str) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the archive has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size of the header in bytes.
    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    /// Size of the whole archive in bytes.
    pub fn archive_len(&self) -> u64 {
        self.archive_len
    }

    /// Read the trailer of `record`.
    pub fn read_trailer<R: Read + Seek>(
        &self,
        reader: &mut ByteReader<R>,
        record: &FileRecord,
    ) -> Result<EntryTrailer> {
        if !record.fits(self.archive_len) {
            return Err(HuffArcError::corrupted(
                record.start as u64,
                format!(
                    "entry {} extent {}..{} does not fit in {} bytes",
                    record.name, record.start, record.end, self.archive_len
                ),
            ));
        }
        reader.seek(record.end as u64 - TRAILER_LEN)?;
        let mut percent = [0u8; 1];
        reader.read_exact(&mut percent)?;
        let original_checksum = reader.read_u16_le()?;
        let segment_checksum = reader.read_u16_le()?;
        Ok(EntryTrailer {
            percent: percent[0] as i8,
            original_checksum,
            segment_checksum,
        })
    }
}
