//! Specimen folder conventions
//!
//! A specimen folder holds its images in `edof` or `redof` (two processing
//! variants of the same scan). Outputs go to a sibling folder named after the
//! input folder plus a task suffix, e.g. `redof_scalebar`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ConfigError, SpecimenError};

/// Conventional image subfolder names
pub const EDOF_FOLDER: &str = "edof";
pub const REDOF_FOLDER: &str = "redof";

/// Image file extensions that are processed (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpeg", "jpg", "png", "bmp", "tiff", "tif", "gif"];

/// Primary and fallback name of the image subfolder
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InputFolders {
    pub primary: String,
    pub fallback: String,
}

impl Default for InputFolders {
    fn default() -> Self {
        Self::new(EDOF_FOLDER, REDOF_FOLDER)
    }
}

impl InputFolders {
    pub fn new(primary: &str, fallback: &str) -> Self {
        Self {
            primary: primary.to_string(),
            fallback: fallback.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in [
            ("input_folders.primary", &self.primary),
            ("input_folders.fallback", &self.fallback),
        ] {
            let name = name.trim();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{name:?} is not a plain folder name"),
                });
            }
        }
        Ok(())
    }

    /// Pick the image folder of `specimen`: primary if present, else fallback
    pub fn select(&self, specimen: &Path) -> Result<PathBuf, SpecimenError> {
        let primary = specimen.join(&self.primary);
        if primary.is_dir() {
            return Ok(primary);
        }

        let fallback = specimen.join(&self.fallback);
        if fallback.is_dir() {
            log::debug!(
                "{} has no `{}` folder, using `{}`",
                specimen.display(),
                self.primary,
                self.fallback
            );
            return Ok(fallback);
        }

        Err(SpecimenError::NoInputFolder {
            folder: specimen.to_path_buf(),
            primary: self.primary.clone(),
            fallback: self.fallback.clone(),
        })
    }
}

/// True if `path` contains an `edof` or `redof` subdirectory
pub fn looks_like_specimen(path: &Path) -> bool {
    path.join(EDOF_FOLDER).is_dir() || path.join(REDOF_FOLDER).is_dir()
}

/// Output folder for `input_folder`: `<specimen>/<input name><suffix>`
pub fn output_folder_for(input_folder: &Path, suffix: &str) -> PathBuf {
    let name = input_folder
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let parent = input_folder.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}{}", name, suffix))
}

/// Check if a file has one of the processed image extensions
pub fn is_image_file(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Image files directly inside `dir`. No ordering is implied.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SpecimenError> {
    let mut images = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| SpecimenError::ListImages {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_select_primary_then_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let specimen = dir.path();
        let folders = InputFolders::new("redof", "edof");

        fs::create_dir(specimen.join("edof")).unwrap();
        assert_eq!(folders.select(specimen).unwrap(), specimen.join("edof"));

        fs::create_dir(specimen.join("redof")).unwrap();
        assert_eq!(folders.select(specimen).unwrap(), specimen.join("redof"));
        let swapped = InputFolders::new("edof", "redof");
        assert_eq!(swapped.select(specimen).unwrap(), specimen.join("edof"));
    }

    #[test]
    fn test_select_without_input_folder() {
        let dir = tempfile::tempdir().unwrap();
        // A file with the right name is not a folder
        fs::write(dir.path().join("edof"), b"").unwrap();

        let result = InputFolders::default().select(dir.path());
        assert!(matches!(result, Err(SpecimenError::NoInputFolder { .. })));
        assert!(!looks_like_specimen(dir.path()));
    }

    #[test]
    fn test_output_folder_name() {
        let input = Path::new("/scans/ZMA-001/redof");
        assert_eq!(
            output_folder_for(input, "_scalebar"),
            PathBuf::from("/scans/ZMA-001/redof_scalebar")
        );
        assert_eq!(
            output_folder_for(Path::new("/scans/ZMA-001/edof"), "_sharpen"),
            PathBuf::from("/scans/ZMA-001/edof_sharpen")
        );
    }

    #[test]
    fn test_image_extensions_case_insensitive() {
        assert!(is_image_file(Path::new("a/IMG_0001.JPG")));
        assert!(is_image_file(Path::new("a/stack.Tiff")));
        assert!(is_image_file(Path::new("b.gif")));
        assert!(!is_image_file(Path::new("ScanInformation.pdf")));
        assert!(!is_image_file(Path::new("notes")));
        assert!(!is_image_file(Path::new("model.obj")));
    }

    #[test]
    fn test_list_images_only_direct_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"").unwrap();
        fs::write(dir.path().join("b.PNG"), b"").unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.jpg"), b"").unwrap();

        let mut images = list_images(dir.path()).unwrap();
        images.sort();
        assert_eq!(images, vec![dir.path().join("a.jpg"), dir.path().join("b.PNG")]);
    }

    #[test]
    fn test_validate_folder_names() {
        assert!(InputFolders::default().validate().is_ok());
        assert!(InputFolders::new("", "edof").validate().is_err());
        assert!(InputFolders::new("a/b", "edof").validate().is_err());
        assert!(InputFolders::new("edof", "..").validate().is_err());
    }
}
