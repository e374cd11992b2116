//! Scale bar configuration
//!
//! An immutable value type with documented defaults. It is serialized to JSON
//! for the config file, and every enumerated option rejects unknown values
//! instead of silently falling back to a default.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::batch::specimen::InputFolders;
use crate::error::ConfigError;
use crate::metadata::DEFAULT_METADATA_FILE;

/// Corner of the image the scale bar is anchored to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::BottomRight,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::TopLeft,
    ];

    const EXPECTED: &'static str = "bottom_right, bottom_left, top_right, top_left";

    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::BottomRight => "bottom_right",
            Corner::BottomLeft => "bottom_left",
            Corner::TopRight => "top_right",
            Corner::TopLeft => "top_left",
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Corner::BottomRight | Corner::TopRight)
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, Corner::BottomRight | Corner::BottomLeft)
    }
}

/// Whether the label sits above or below the bar
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    #[default]
    Above,
    Below,
}

impl TextPosition {
    pub const ALL: [TextPosition; 2] = [TextPosition::Above, TextPosition::Below];

    const EXPECTED: &'static str = "above, below";

    pub fn as_str(&self) -> &'static str {
        match self {
            TextPosition::Above => "above",
            TextPosition::Below => "below",
        }
    }
}

/// Horizontal alignment of the label relative to the bar
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    #[default]
    Right,
}

impl TextAlignment {
    pub const ALL: [TextAlignment; 3] = [
        TextAlignment::Left,
        TextAlignment::Center,
        TextAlignment::Right,
    ];

    const EXPECTED: &'static str = "left, center, right";

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
        }
    }
}

/// Normalize user input: `Bottom-Right` and `bottom_right` are the same option
fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for Corner {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|corner| corner.as_str() == normalize(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                field: "corner",
                value: s.to_string(),
                expected: Corner::EXPECTED,
            })
    }
}

impl FromStr for TextPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextPosition::ALL
            .into_iter()
            .find(|position| position.as_str() == normalize(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                field: "text_position",
                value: s.to_string(),
                expected: TextPosition::EXPECTED,
            })
    }
}

impl FromStr for TextAlignment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextAlignment::ALL
            .into_iter()
            .find(|alignment| alignment.as_str() == normalize(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                field: "text_alignment",
                value: s.to_string(),
                expected: TextAlignment::EXPECTED,
            })
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TextAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All scale bar settings
///
/// Every field is optional in the config file; missing fields take the
/// defaults listed here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleBarConfig {
    /// Corner the annotation is anchored to (default: bottom_right)
    pub corner: Corner,

    /// Label above or below the bar (default: above)
    pub text_position: TextPosition,

    /// Label alignment relative to the bar (default: right)
    pub text_alignment: TextAlignment,

    /// Gap between bar and label in pixels (default: 20)
    pub text_bar_margin: u32,

    /// Bar thickness in pixels (default: 10)
    pub scalebar_height: u32,

    /// Distance from the nearest vertical image edge (default: 50)
    pub x_margin: u32,

    /// Distance from the nearest horizontal image edge (default: 150)
    pub y_margin: u32,

    /// Label font size in pixels (default: 100)
    pub fontsize: u32,

    /// Font file name or path (default: times.ttf)
    pub font_style: String,

    /// Extra directories searched for `font_style` before the system ones
    pub font_dirs: Vec<PathBuf>,

    /// Name of the scan metadata document in each specimen folder
    pub metadata_file: String,

    /// Image subfolder names, tried in order (default: redof, then edof)
    pub input_folders: InputFolders,

    /// Output folder is the input folder name plus this suffix (default: _scalebar)
    pub output_suffix: String,
}

impl Default for ScaleBarConfig {
    fn default() -> Self {
        Self {
            corner: Corner::default(),
            text_position: TextPosition::default(),
            text_alignment: TextAlignment::default(),
            text_bar_margin: 20,
            scalebar_height: 10,
            x_margin: 50,
            y_margin: 150,
            fontsize: 100,
            font_style: "times.ttf".to_string(),
            font_dirs: Vec::new(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            input_folders: InputFolders::new("redof", "edof"),
            output_suffix: "_scalebar".to_string(),
        }
    }
}

impl ScaleBarConfig {
    /// Check the values that can be checked without seeing an image.
    ///
    /// Margins are validated per image at render time, since whether they fit
    /// depends on the image size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scalebar_height == 0 {
            return Err(invalid("scalebar_height", "must be at least 1 pixel"));
        }
        if self.fontsize == 0 {
            return Err(invalid("fontsize", "must be at least 1 pixel"));
        }
        if self.font_style.trim().is_empty() {
            return Err(invalid("font_style", "must not be empty"));
        }
        if self.metadata_file.trim().is_empty() {
            return Err(invalid("metadata_file", "must not be empty"));
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

pub(crate) fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScaleBarConfig::default();
        assert_eq!(config.corner, Corner::BottomRight);
        assert_eq!(config.text_position, TextPosition::Above);
        assert_eq!(config.text_alignment, TextAlignment::Right);
        assert_eq!(config.text_bar_margin, 20);
        assert_eq!(config.scalebar_height, 10);
        assert_eq!(config.fontsize, 100);
        assert_eq!(config.font_style, "times.ttf");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("top_left".parse::<Corner>().unwrap(), Corner::TopLeft);
        assert_eq!("Bottom-Left".parse::<Corner>().unwrap(), Corner::BottomLeft);
        assert_eq!("below".parse::<TextPosition>().unwrap(), TextPosition::Below);
        assert_eq!(" CENTER ".parse::<TextAlignment>().unwrap(), TextAlignment::Center);
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        assert!(matches!(
            "middle".parse::<Corner>(),
            Err(ConfigError::UnknownVariant { field: "corner", .. })
        ));
        assert!("beside".parse::<TextPosition>().is_err());
        assert!("justify".parse::<TextAlignment>().is_err());

        let json = r#"{ "corner": "center" }"#;
        assert!(serde_json::from_str::<ScaleBarConfig>(json).is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "corner": "top_left", "fontsize": 60 }"#;
        let config = serde_json::from_str::<ScaleBarConfig>(json).unwrap();

        assert_eq!(config.corner, Corner::TopLeft);
        assert_eq!(config.fontsize, 60);
        assert_eq!(config.scalebar_height, 10);
        assert_eq!(config.input_folders, InputFolders::new("redof", "edof"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<ScaleBarConfig>(r#"{ "colour": "red" }"#).is_err());
    }

    #[test]
    fn test_serialization() {
        let mut config = ScaleBarConfig::default();
        config.text_alignment = TextAlignment::Center;
        config.x_margin = 75;

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"center\""));
        assert_eq!(serde_json::from_str::<ScaleBarConfig>(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut config = ScaleBarConfig::default();
        config.scalebar_height = 0;
        assert!(config.validate().is_err());

        let mut config = ScaleBarConfig::default();
        config.fontsize = 0;
        assert!(config.validate().is_err());

        let mut config = ScaleBarConfig::default();
        config.output_suffix.clear();
        assert!(config.validate().is_err());
    }
}
