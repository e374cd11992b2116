//! Sharpening options

use serde::{Deserialize, Serialize};

use crate::batch::specimen::InputFolders;
use crate::error::ConfigError;
use crate::scalebar::options::invalid;

/// All sharpening settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SharpenConfig {
    /// Gaussian sigma of the unsharp mask (default: 1.5)
    pub unsharp_radius: f32,

    /// Unsharp mask strength in percent (default: 150)
    pub unsharp_percent: f32,

    /// Gaussian sigma of the high-pass overlay (default: 1.0)
    pub highpass_radius: f32,

    /// Image subfolder names, tried in order (default: edof, then redof)
    pub input_folders: InputFolders,

    /// Output folder is the input folder name plus this suffix (default: _sharpen)
    pub output_suffix: String,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            unsharp_radius: 1.5,
            unsharp_percent: 150.0,
            highpass_radius: 1.0,
            input_folders: InputFolders::default(),
            output_suffix: "_sharpen".to_string(),
        }
    }
}

impl SharpenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, radius) in [
            ("unsharp_radius", self.unsharp_radius),
            ("highpass_radius", self.highpass_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid(field, "must be a positive number"));
            }
        }
        if !self.unsharp_percent.is_finite() || self.unsharp_percent < 0.0 {
            return Err(invalid("unsharp_percent", "must be zero or more"));
        }
        if self.output_suffix.is_empty() {
            return Err(invalid(
                "output_suffix",
                "must not be empty, outputs would land in the input folder",
            ));
        }
        self.input_folders.validate()
    }
}
