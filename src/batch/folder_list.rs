//! Folder list files
//!
//! A plain text (or csv) file naming specimen folders, either one per line or
//! several per line separated by commas. Both forms may be mixed in one file.

use std::path::{Path, PathBuf};

use crate::error::BatchError;

/// Parse folder paths from the contents of a list file.
///
/// Entries are trimmed, surrounding double quotes are removed and empty
/// entries are dropped.
pub fn parse_folder_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .flat_map(|line| line.split(','))
        .map(clean_entry)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Read and parse a folder list file
pub fn read_folder_list(path: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let text = std::fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let folders = parse_folder_list(&text);
    log::info!("📄 Read {} specimen folders from {}", folders.len(), path.display());
    Ok(folders)
}

fn clean_entry(entry: &str) -> &str {
    let entry = entry.trim();
    entry
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(entry)
}
