//! Decompress command implementation.

use crate::utils::matches_selection;
use huffarc_archive::ArchiveManager;
use std::path::Path;

pub fn cmd_decompress(
    archive: &Path,
    files: &[String],
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ArchiveManager::new();
    let written = if files.is_empty() {
        manager.decompress_all(archive, output)?
    } else {
        manager.decompress_matching(archive, output, |record| {
            matches_selection(&record.name, files)
        })?
    };

    if written.is_empty() {
        println!("No files extracted from {}", archive.display());
        return Ok(());
    }

    for path in &written {
        println!("  {}", path.display());
    }
    println!(
        "Extracted {} file{} to {}",
        written.len(),
        if written.len() == 1 { "" } else { "s" },
        output.display()
    );

    Ok(())
}
