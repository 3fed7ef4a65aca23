//! List command implementation.

use crate::utils::format_size;
use huffarc_archive::{ArchiveIndex, FileRecord};
use serde::Serialize;
use std::path::Path;

/// JSON serializable header record.
#[derive(Debug, Serialize)]
struct RecordJson {
    name: String,
    start: u32,
    end: u32,
    compressed_size: u64,
}

impl RecordJson {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            start: record.start,
            end: record.end,
            compressed_size: record.compressed_len(),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize)]
struct ArchiveListJson {
    archive: String,
    size: u64,
    header_size: u64,
    entries: Vec<RecordJson>,
}

pub fn cmd_list(archive: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let index = ArchiveIndex::open(archive)?;

    if json {
        let output = ArchiveListJson {
            archive: archive.display().to_string(),
            size: index.archive_len(),
            header_size: index.header_len(),
            entries: index.records().iter().map(RecordJson::from_record).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    println!("{:>10}  {:>10}  {:>10}  Name", "Start", "End", "Size");
    println!("{:>10}  {:>10}  {:>10}  ----", "-----", "---", "----");
    for record in index.records() {
        println!(
            "{:>10}  {:>10}  {:>10}  {}",
            record.start,
            record.end,
            format_size(record.compressed_len()),
            record.name
        );
    }
    println!();
    println!(
        "{} entries, {} total",
        index.len(),
        format_size(index.archive_len())
    );

    Ok(())
}
