//! Application configuration
//!
//! One JSON file with a section per concern. Every field is optional; a
//! missing file at the default location means all defaults.
//!
//! ```json
//! {
//!   "scalebar": { "corner": "top_left", "fontsize": 80 },
//!   "sharpen": { "unsharp_percent": 120 },
//!   "batch": { "jobs": 4 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::input::InputMode;
use crate::error::ConfigError;
use crate::scalebar::options::{invalid, ScaleBarConfig};
use crate::sharpen::options::SharpenConfig;

/// Directory name under the platform config dir
pub const APP_NAME: &str = "specimen-scalebar";

/// Config file name inside that directory
pub const CONFIG_FILE: &str = "config.json";

/// Batch execution settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Specimen folders processed at the same time (default: 1)
    pub jobs: usize,

    /// How the input path is interpreted (default: auto)
    pub mode: InputMode,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            mode: InputMode::Auto,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub scalebar: ScaleBarConfig,
    pub sharpen: SharpenConfig,
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Default config file location (e.g. `~/.config/specimen-scalebar/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise all defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config = Self::from_file(&path)?;
        log::info!("⚙️  Loaded config from {}", path.display());
        Ok(config)
    }

    /// Read and parse one config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.jobs == 0 {
            return Err(invalid("batch.jobs", "must be at least 1"));
        }
        self.scalebar.validate()?;
        self.sharpen.validate()
    }
}
