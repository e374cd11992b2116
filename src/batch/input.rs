//! Batch input resolution
//!
//! Turns the single path given by the caller into the list of specimen folders
//! to process: one specimen folder, every subfolder of a parent folder, or the
//! folders named in a list file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::batch::folder_list::read_folder_list;
use crate::batch::specimen::looks_like_specimen;
use crate::error::{BatchError, ConfigError};

/// How to interpret the input path
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// File → list; folder with `edof`/`redof` → specimen; other folder → parent
    #[default]
    Auto,
    Specimen,
    Parent,
    List,
}

impl InputMode {
    pub const ALL: [InputMode; 4] = [
        InputMode::Auto,
        InputMode::Specimen,
        InputMode::Parent,
        InputMode::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Auto => "auto",
            InputMode::Specimen => "specimen",
            InputMode::Parent => "parent",
            InputMode::List => "list",
        }
    }
}

impl FromStr for InputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        InputMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownVariant {
                field: "mode",
                value: s.to_string(),
                expected: "auto, specimen, parent, list",
            })
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve `path` into the specimen folders to process
pub fn resolve_specimen_folders(path: &Path, mode: InputMode) -> Result<Vec<PathBuf>, BatchError> {
    if !path.exists() {
        return Err(BatchError::MissingInput(path.to_path_buf()));
    }

    let mode = match mode {
        InputMode::Auto if path.is_file() => InputMode::List,
        InputMode::Auto if looks_like_specimen(path) => InputMode::Specimen,
        InputMode::Auto => InputMode::Parent,
        explicit => explicit,
    };
    log::debug!("Resolving {} as {}", path.display(), mode);

    match mode {
        InputMode::List => {
            if !path.is_file() {
                return Err(BatchError::NotAListFile {
                    path: path.to_path_buf(),
                });
            }
            read_folder_list(path)
        }
        InputMode::Specimen => {
            require_dir(path)?;
            Ok(vec![path.to_path_buf()])
        }
        InputMode::Parent | InputMode::Auto => {
            require_dir(path)?;
            subdirectories(path)
        }
    }
}

fn require_dir(path: &Path) -> Result<(), BatchError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(BatchError::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

/// Immediate subdirectories of `parent`, sorted by name for a stable report
fn subdirectories(parent: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut folders = Vec::new();

    for entry in WalkDir::new(parent)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BatchError::Io {
            path: parent.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }

    Ok(folders)
}
