//! Utility functions for the CLI.

use glob::{MatchOptions, Pattern};
use huffarc_archive::ARCHIVE_EXTENSION;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Archive name used when the current directory has none.
const FALLBACK_NAME: &str = "Archive";

/// Default archive path for the given command-line sources.
///
/// `args` are the arguments as typed, `files` what they expanded to.
///
/// - One plain argument, or one pattern with a single match:
///   `<parent>/<stem>.harc`, next to that path.
/// - Otherwise: `<name of cwd>.harc` in the current directory.
pub fn default_archive_path(args: &[PathBuf], files: &[PathBuf], cwd: &Path) -> PathBuf {
    let single = match (args, files) {
        ([arg], _) if !is_pattern(&arg.to_string_lossy()) => Some(arg),
        ([_], [file]) => Some(file),
        _ => None,
    };
    if let Some((path, stem)) = single.and_then(|path| path.file_stem().map(|stem| (path, stem))) {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        return parent.join(stem).with_extension(ARCHIVE_EXTENSION);
    }
    let name = cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    PathBuf::from(format!("{}.{}", name, ARCHIVE_EXTENSION))
}

/// Whether `arg` should be treated as a glob pattern.
fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand command-line sources into the files to compress.
///
/// Directories expand recursively in sorted order. Plain paths pass through
/// unchanged even if they do not exist (the archiver reports and skips
/// those). Patterns are matched against every file below their literal
/// prefix, with `*` crossing directory boundaries, so `*.log` also picks up
/// `logs/old/a.log`.
pub fn expand_sources(args: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for arg in args {
        if is_pattern(&arg.to_string_lossy()) {
            expand_pattern(arg, &mut files)?;
        } else {
            push_path(arg.clone(), &mut files)?;
        }
    }
    Ok(files)
}

fn expand_pattern(
    pattern: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let base: PathBuf = pattern
        .components()
        .take_while(|component| !is_pattern(&component.as_os_str().to_string_lossy()))
        .collect();
    let matcher = Pattern::new(&pattern.strip_prefix(&base)?.to_string_lossy())?;
    let root = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base.as_path()
    };
    if !root.is_dir() {
        return Ok(());
    }

    let options = MatchOptions {
        require_literal_separator: false,
        ..MatchOptions::new()
    };
    let mut found = Vec::new();
    collect_files(root, &mut found)?;
    for path in found {
        let relative = path.strip_prefix(root)?;
        if matcher.matches_path_with(relative, options) {
            files.push(base.join(relative));
        }
    }
    Ok(())
}

fn push_path(path: PathBuf, files: &mut Vec<PathBuf>) -> io::Result<()> {
    if path.is_dir() {
        collect_files(&path, files)
    } else {
        files.push(path);
        Ok(())
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    for path in entries {
        push_path(path, files)?;
    }
    Ok(())
}

/// Whether an entry name is selected by `patterns`.
///
/// No patterns selects everything. A pattern matches the full name, the
/// file name, or the file stem; patterns that are not valid globs must
/// match exactly.
pub fn matches_selection(name: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let path = Path::new(name);
    let candidates: Vec<&str> = [
        Some(name),
        path.file_name().and_then(|n| n.to_str()),
        path.file_stem().and_then(|n| n.to_str()),
    ]
    .into_iter()
    .flatten()
    .collect();

    patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(glob) => candidates.iter().any(|candidate| glob.matches(candidate)),
        Err(_) => candidates.iter().any(|candidate| candidate == pattern),
    })
}

/// Format a byte count for display.
pub fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    }
}
