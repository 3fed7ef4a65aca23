//! Test command implementation.

use huffarc_archive::ArchiveManager;
use std::path::Path;

pub fn cmd_test(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ArchiveManager::new();
    println!("Testing {}", archive.display());

    let Some(checksum) = manager.archive_checksum(archive)? else {
        println!("  Archive is empty or truncated");
        std::process::exit(2);
    };

    if checksum.is_valid() {
        println!("  OK: checksum {:#06x}", checksum.stored);
        return Ok(());
    }

    println!(
        "  FAILED: stored checksum {:#06x}, computed {:#06x}",
        checksum.stored, checksum.computed
    );

    let reports = manager.list_damaged(archive)?;
    let damaged = reports.iter().filter(|report| report.damaged).count();
    for report in &reports {
        let status = if report.damaged { "DAMAGED" } else { "OK" };
        println!("  {:<8} {}", status, report.name);
    }

    println!();
    println!("Test results:");
    println!("  Total entries: {}", reports.len());
    println!("  Intact:        {}", reports.len() - damaged);
    println!("  Damaged:       {}", damaged);
    std::process::exit(2);
}
