//! Compress command implementation.

use crate::utils::{default_archive_path, expand_sources, format_size};
use huffarc_archive::{ArchiveManager, CompressOutcome};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn cmd_compress(
    paths: &[PathBuf],
    archive: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = expand_sources(paths)?;
    let archive = match archive {
        Some(path) => path.to_path_buf(),
        None => default_archive_path(paths, &sources, &std::env::current_dir()?),
    };
    debug!(
        sources = sources.len(),
        archive = %archive.display(),
        "expanded inputs"
    );

    let manager = ArchiveManager::new();
    match manager.compress(sources.as_slice(), &archive)? {
        CompressOutcome::Skipped => {
            println!("Nothing to compress: none of the inputs exist");
        }
        CompressOutcome::UpToDate { entries } => {
            println!(
                "{} is up to date ({} file{})",
                archive.display(),
                entries,
                if entries == 1 { "" } else { "s" }
            );
        }
        CompressOutcome::Written(report) => {
            let verb = if report.created { "Created" } else { "Updated" };
            println!("{} {}", verb, archive.display());
            if !report.created {
                println!("  Added:        {}", report.entries_added);
                println!("  Recompressed: {}", report.entries_recompressed);
                println!("  Unchanged:    {}", report.entries_kept);
            }
            println!(
                "  Total: {} files, {}",
                report.total_entries(),
                format_size(report.total_bytes)
            );
        }
    }

    Ok(())
}
