//! Decompression to the filesystem.

use crate::codec::decode_entry;
use crate::layout::{ArchiveIndex, FileRecord};
use crate::manager::ArchiveManager;
use huffarc_core::buffer::{ByteReader, ByteWriter};
use huffarc_core::error::{HuffArcError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Where entry `name` is written under `dest`.
///
/// Only the normal components of the stored name are kept, so absolute
/// names and `..` segments stay inside `dest`.
pub fn output_path(dest: &Path, name: &str) -> Result<PathBuf> {
    let relative: PathBuf = Path::new(name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    if relative.as_os_str().is_empty() {
        return Err(HuffArcError::invalid_entry_name(
            name,
            "name has no file component",
        ));
    }
    Ok(dest.join(relative))
}

impl ArchiveManager {
    /// Decompress every entry of `archive` under `dest`.
    pub fn decompress_all(
        &self,
        archive: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        self.decompress_matching(archive, dest, |_| true)
    }

    /// Decompress the entries of `archive` for which `select` returns true.
    ///
    /// A missing or empty archive yields no files. An archive whose
    /// whole-archive checksum fails is refused before anything is written.
    pub fn decompress_matching<F>(
        &self,
        archive: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        mut select: F,
    ) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&FileRecord) -> bool,
    {
        let archive = archive.as_ref();
        let dest = dest.as_ref();
        match fs::metadata(archive) {
            Ok(meta) if meta.len() == 0 => return Ok(Vec::new()),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(archive = %archive.display(), "archive does not exist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        }

        match self.archive_checksum(archive)? {
            Some(checksum) if checksum.is_valid() => {}
            Some(checksum) => {
                warn!(archive = %archive.display(), "refusing to decompress corrupted archive");
                return Err(HuffArcError::checksum_mismatch(
                    checksum.stored,
                    checksum.computed,
                ));
            }
            None => {
                return Err(HuffArcError::corrupted(0, "archive too short for a checksum"));
            }
        }

        let config = self.config();
        let index = ArchiveIndex::open_with_config(archive, config)?;
        let mut reader = ByteReader::with_capacity(config.buffer_capacity, File::open(archive)?);
        let mut written = Vec::new();
        for record in index.records() {
            if !select(record) {
                continue;
            }
            let path = output_path(dest, &record.name)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut output = ByteWriter::with_capacity(config.buffer_capacity, File::create(&path)?);
            reader.seek(record.start as u64)?;
            let decoded = decode_entry(&mut reader, &mut output, config)?;
            output.finish()?;

            if decoded.name != record.name {
                return Err(HuffArcError::corrupted(
                    record.start as u64,
                    format!("record {} points at entry {}", record.name, decoded.name),
                ));
            }
            let end = reader.tell()?;
            if end != record.end as u64 {
                return Err(HuffArcError::corrupted(
                    end,
                    format!("entry {} ends at {}, header says {}", record.name, end, record.end),
                ));
            }
            if !decoded.checksum_matches() {
                warn!(
                    name = record.name.as_str(),
                    stored = decoded.trailer.original_checksum,
                    computed = decoded.checksum,
                    "decompressed data does not match the original checksum"
                );
            }
            debug!(name = record.name.as_str(), path = %path.display(), "extracted entry");
            written.push(path);
        }

        info!(archive = %archive.display(), files = written.len(), "decompressed archive");
        Ok(written)
    }
}
