//! Info command implementation.

use huffarc_archive::{ArchiveManager, EntryInfo, average_percent};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct EntryInfoJson {
    name: String,
    percent: i8,
    compressed_size: u64,
}

#[derive(Debug, Serialize)]
struct ArchiveInfoJson {
    archive: String,
    entries: Vec<EntryInfoJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    average_percent: Option<i64>,
}

impl From<&EntryInfo> for EntryInfoJson {
    fn from(entry: &EntryInfo) -> Self {
        Self {
            name: entry.name.clone(),
            percent: entry.percent,
            compressed_size: entry.compressed_len,
        }
    }
}

pub fn cmd_info(archive: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let entries = ArchiveManager::new().info(archive)?;
    let average = average_percent(&entries);

    if json {
        let output = ArchiveInfoJson {
            archive: archive.display().to_string(),
            entries: entries.iter().map(EntryInfoJson::from).collect(),
            average_percent: average,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    println!("{:>8}  Name", "Saved");
    println!("{:>8}  ----", "-----");
    for entry in &entries {
        println!("{:>7}%  {}", entry.percent, entry.name);
    }

    match average {
        Some(average) => {
            println!();
            println!("Average: {}%", average);
        }
        None => println!("(empty archive)"),
    }

    Ok(())
}
