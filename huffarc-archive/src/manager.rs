//! Incremental archive manager.
//!
//! Each candidate source is classified against the existing archive:
//!
//! - **New**: no record with the same name.
//! - **Unchanged**: the source checksum equals the original checksum stored
//!   in the record's trailer. Its bytes are copied verbatim.
//! - **Stale**: anything else. It is compressed again.
//!
//! A missing archive is built directly at its final path. An existing one
//! is rebuilt into `<archive>.tmp` and renamed over the original, so the
//! archive path only ever names a fully written archive. When every
//! candidate is unchanged the archive is left alone.

use crate::codec::encode_entry;
use crate::config::CodecConfig;
use crate::layout::{ArchiveIndex, FileRecord, HeaderLayout, SEPARATOR, validate_name};
use huffarc_core::buffer::{ByteReader, ByteWriter};
use huffarc_core::checksum::{checksum_file, checksum_range};
use huffarc_core::error::{HuffArcError, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a candidate relates to the existing archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Not in the archive yet.
    New,
    /// Archived and identical by checksum.
    Unchanged,
    /// Archived, but the source changed or the archived entry is unreadable.
    Stale,
}

/// A candidate source with its archive name and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Entry name (the source path as given).
    pub name: String,
    /// Source file on disk.
    pub source: PathBuf,
    /// Classification against the existing archive.
    pub status: EntryStatus,
    /// Existing record, when the archive has one with this name.
    pub record: Option<FileRecord>,
}

/// Counts for one written archive.
#[must_use = "build report should be checked to verify the archive contents"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Whether the archive did not exist before.
    pub created: bool,
    /// Entries compressed for the first time.
    pub entries_added: usize,
    /// Entries compressed again because their source changed.
    pub entries_recompressed: usize,
    /// Entries copied verbatim from the previous archive.
    pub entries_kept: usize,
    /// Size of the written archive.
    pub total_bytes: u64,
}

impl BuildReport {
    /// Number of entries in the written archive.
    pub fn total_entries(&self) -> usize {
        self.entries_added + self.entries_recompressed + self.entries_kept
    }
}

/// What a compression run did.
#[must_use = "compression outcome should be checked"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    /// None of the candidate sources exist; nothing was written.
    Skipped,
    /// Every candidate is archived unchanged; the archive was not touched.
    UpToDate {
        /// Number of candidates.
        entries: usize,
    },
    /// The archive was written.
    Written(BuildReport),
}

/// Entry point for archive operations with a fixed [`CodecConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveManager {
    config: CodecConfig,
}

impl ArchiveManager {
    /// Create a manager with the standard configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with custom settings.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress `sources` into `archive`, reusing unchanged entries.
    ///
    /// The resulting archive holds exactly the existing candidates, in the
    /// order given. Missing sources and repeated names are skipped.
    pub fn compress<P: AsRef<Path>>(
        &self,
        sources: &[P],
        archive: impl AsRef<Path>,
    ) -> Result<CompressOutcome> {
        let archive = archive.as_ref();
        let index = self.existing_index(archive)?;
        let plan = self.plan_with_index(sources, archive, index.as_ref())?;

        if plan.is_empty() {
            warn!(archive = %archive.display(), "no candidate source exists");
            return Ok(CompressOutcome::Skipped);
        }

        if index.is_none() {
            let mut report = self.build_or_remove(archive, &plan, None)?;
            report.created = true;
            info!(
                archive = %archive.display(),
                entries = report.total_entries(),
                bytes = report.total_bytes,
                "created archive"
            );
            return Ok(CompressOutcome::Written(report));
        }

        if plan.iter().all(|entry| entry.status == EntryStatus::Unchanged) {
            info!(archive = %archive.display(), entries = plan.len(), "archive is up to date");
            return Ok(CompressOutcome::UpToDate {
                entries: plan.len(),
            });
        }

        let temp = temp_path(archive);
        let report = self.build_or_remove(&temp, &plan, Some(archive))?;
        if let Err(err) = fs::rename(&temp, archive) {
            remove_partial(&temp);
            return Err(err.into());
        }
        info!(
            archive = %archive.display(),
            added = report.entries_added,
            recompressed = report.entries_recompressed,
            kept = report.entries_kept,
            bytes = report.total_bytes,
            "replaced archive"
        );
        Ok(CompressOutcome::Written(report))
    }

    /// Classify `sources` against `archive` without writing anything.
    pub fn plan<P: AsRef<Path>>(
        &self,
        sources: &[P],
        archive: impl AsRef<Path>,
    ) -> Result<Vec<PlannedEntry>> {
        let archive = archive.as_ref();
        let index = self.existing_index(archive)?;
        self.plan_with_index(sources, archive, index.as_ref())
    }

    /// Header of `archive`, or `None` when there is nothing to read.
    fn existing_index(&self, archive: &Path) -> Result<Option<ArchiveIndex>> {
        match fs::metadata(archive) {
            Ok(meta) if meta.len() == 0 => Ok(None),
            Ok(_) => ArchiveIndex::open_with_config(archive, &self.config).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn plan_with_index<P: AsRef<Path>>(
        &self,
        sources: &[P],
        archive: &Path,
        index: Option<&ArchiveIndex>,
    ) -> Result<Vec<PlannedEntry>> {
        let mut reader = match index {
            Some(_) => Some(ByteReader::with_capacity(
                self.config.buffer_capacity,
                File::open(archive)?,
            )),
            None => None,
        };

        let mut seen = HashSet::new();
        let mut plan = Vec::with_capacity(sources.len());
        for source in sources {
            let source = source.as_ref();
            if !source.is_file() {
                warn!(source = %source.display(), "skipping missing source");
                continue;
            }
            let name = entry_name(source)?;
            validate_name(&name, &self.config)?;
            if !seen.insert(name.clone()) {
                warn!(name = name.as_str(), "skipping repeated source");
                continue;
            }

            let record = index.and_then(|index| index.find(&name)).cloned();
            let status = match (index, reader.as_mut(), record.as_ref()) {
                (Some(index), Some(reader), Some(record)) => {
                    self.status_of(index, reader, record, source)?
                }
                _ => EntryStatus::New,
            };
            debug!(name = name.as_str(), ?status, "classified candidate");
            plan.push(PlannedEntry {
                name,
                source: source.to_path_buf(),
                status,
                record,
            });
        }
        Ok(plan)
    }

    fn status_of<R: Read + Seek>(
        &self,
        index: &ArchiveIndex,
        reader: &mut ByteReader<R>,
        record: &FileRecord,
        source: &Path,
    ) -> Result<EntryStatus> {
        let trailer = match index.read_trailer(reader, record) {
            Ok(trailer) => trailer,
            Err(err) if err.is_format_violation() => {
                warn!(name = record.name.as_str(), error = %err, "archived entry unreadable, recompressing");
                return Ok(EntryStatus::Stale);
            }
            Err(err) => return Err(err),
        };
        if checksum_file(source)? == trailer.original_checksum {
            Ok(EntryStatus::Unchanged)
        } else {
            Ok(EntryStatus::Stale)
        }
    }

    fn build_or_remove(
        &self,
        path: &Path,
        plan: &[PlannedEntry],
        previous: Option<&Path>,
    ) -> Result<BuildReport> {
        self.build(path, plan, previous).inspect_err(|_| remove_partial(path))
    }

    /// Write a complete archive for `plan` at `path`.
    ///
    /// Unchanged entries are copied from the `previous` archive.
    fn build(
        &self,
        path: &Path,
        plan: &[PlannedEntry],
        previous: Option<&Path>,
    ) -> Result<BuildReport> {
        let capacity = self.config.buffer_capacity;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = ByteWriter::with_capacity(capacity, file);

        let names = plan.iter().map(|entry| entry.name.clone()).collect();
        let mut layout = HeaderLayout::new(names, &self.config)?;
        layout.write(&mut writer)?;

        let mut old = match previous {
            Some(old_path) => Some(ByteReader::with_capacity(capacity, File::open(old_path)?)),
            None => None,
        };

        let mut report = BuildReport::default();
        for (index, entry) in plan.iter().enumerate() {
            if index > 0 {
                writer.write_byte(SEPARATOR)?;
            }
            let start = writer.tell()?;
            match (entry.status, entry.record.as_ref(), old.as_mut()) {
                (EntryStatus::Unchanged, Some(record), Some(reader)) => {
                    copy_entry(reader, record, &mut writer, capacity)?;
                    debug!(name = entry.name.as_str(), "kept entry");
                    report.entries_kept += 1;
                }
                (status, _, _) => {
                    encode_entry(&mut writer, &entry.name, &entry.source, &self.config)?;
                    if status == EntryStatus::New {
                        report.entries_added += 1;
                    } else {
                        report.entries_recompressed += 1;
                    }
                }
            }
            let end = writer.tell()?;
            layout.patch_offsets(&mut writer, index, start, end)?;
        }

        writer.flush()?;
        let checksum = {
            let file = writer.get_mut()?;
            let mut reader = ByteReader::with_capacity(capacity, &mut *file);
            checksum_range(&mut reader, 0, None)?
        };
        writer.get_mut()?.seek(SeekFrom::End(0))?;
        writer.write_u16_le(checksum)?;

        let file = writer.finish()?;
        file.sync_all()?;
        report.total_bytes = file.metadata()?.len();
        Ok(report)
    }
}

/// Archive name of a source path: the path string as given.
pub fn entry_name(source: &Path) -> Result<String> {
    source
        .to_str()
        .map(str::to_owned)
        .ok_or_else(|| {
            HuffArcError::invalid_entry_name(source.to_string_lossy(), "path is not valid UTF-8")
        })
}

/// `<archive>.tmp`, next to the archive.
pub fn temp_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn remove_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "could not remove partial archive");
        }
    }
}

/// Copy the bytes of `record` from the old archive unchanged.
fn copy_entry<R: Read + Seek, W: Write + Seek>(
    reader: &mut ByteReader<R>,
    record: &FileRecord,
    writer: &mut ByteWriter<W>,
    capacity: usize,
) -> Result<()> {
    reader.seek(record.start as u64)?;
    let mut buffer = vec![0u8; capacity.max(1)];
    let mut remaining = record.compressed_len();
    while remaining > 0 {
        let n = remaining.min(buffer.len() as u64) as usize;
        reader.read_exact(&mut buffer[..n])?;
        writer.write_all(&buffer[..n])?;
        remaining -= n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("dir/data.harc")),
            PathBuf::from("dir/data.harc.tmp")
        );
    }

    #[test]
    fn test_entry_name_is_path_string() {
        assert_eq!(entry_name(Path::new("a/b.txt")).unwrap(), "a/b.txt");
    }

    #[test]
    fn test_plan_without_archive() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, b"alpha").unwrap();
        let missing = dir.path().join("missing.txt");

        let manager = ArchiveManager::new();
        let plan = manager
            .plan(&[&a, &missing, &a], dir.path().join("x.harc"))
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].status, EntryStatus::New);
        assert!(plan[0].record.is_none());
    }

    #[test]
    fn test_plan_against_archive() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        fs::write(&a, b"alpha").unwrap();
        fs::write(&b, b"bravo").unwrap();
        let archive = dir.path().join("x.harc");

        let manager = ArchiveManager::new();
        let outcome = manager.compress(&[&a, &b], &archive).unwrap();
        assert!(matches!(outcome, CompressOutcome::Written(ref r) if r.created));

        fs::write(&b, b"bravo!").unwrap();
        fs::write(&c, b"charlie").unwrap();
        let statuses: Vec<EntryStatus> = manager
            .plan(&[&a, &b, &c], &archive)
            .unwrap()
            .into_iter()
            .map(|entry| entry.status)
            .collect();
        assert_eq!(
            statuses,
            vec![EntryStatus::Unchanged, EntryStatus::Stale, EntryStatus::New]
        );
    }

    #[test]
    fn test_failed_build_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, b"alpha").unwrap();
        let archive = dir.path().join("x.harc");
        let manager = ArchiveManager::new();
        let mut plan = manager.plan(&[&a], &archive).unwrap();

        // The source disappears after planning.
        fs::remove_file(&a).unwrap();
        plan[0].status = EntryStatus::Stale;
        let temp = temp_path(&archive);
        assert!(manager.build_or_remove(&temp, &plan, None).is_err());
        assert!(!temp.exists());
        assert!(!archive.exists());
    }

    #[test]
    fn test_build_report_totals() {
        let report = BuildReport {
            entries_added: 1,
            entries_recompressed: 2,
            entries_kept: 3,
            ..Default::default()
        };
        assert_eq!(report.total_entries(), 6);
    }
}
