//! Object pixel pitch extraction
//!
//! The scanner writes a `ScanInformation.pdf` next to every scan. Section `2.5.`
//! on its first page carries the object pixel pitch in micrometers, either on the
//! same line after `": "` or alone on the following line.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use lopdf::Document;

use crate::error::{LayoutError, MetadataError};
use crate::scalebar::layout::scalebar_length_px;

/// Section marker of the "Object Pixel Pitch" line
const PITCH_SECTION_PREFIX: &str = "2.5.";

/// Separator between the section title and its value
const VALUE_SEPARATOR: &str = ": ";

/// Real-world distance covered by one image pixel, in micrometers.
///
/// Only constructed through [`PixelPitch::parse`] / [`PixelPitch::new`], so the
/// value is always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPitch(f64);

impl PixelPitch {
    /// Wrap a pitch value, rejecting zero, negative and non-finite values
    pub fn new(micrometers: f64) -> Result<Self, MetadataError> {
        if micrometers.is_finite() && micrometers > 0.0 {
            Ok(Self(micrometers))
        } else {
            Err(MetadataError::InvalidPitch(micrometers.to_string()))
        }
    }

    /// Parse the textual value found in the metadata document.
    ///
    /// The first whitespace-separated token must be a number; anything after it
    /// (usually a unit such as `um`) is ignored.
    pub fn parse(value: &str) -> Result<Self, MetadataError> {
        let token = value
            .split_whitespace()
            .next()
            .ok_or_else(|| MetadataError::InvalidPitch(value.to_string()))?;

        let micrometers: f64 = token
            .parse()
            .map_err(|_| MetadataError::InvalidPitch(value.to_string()))?;

        Self::new(micrometers).map_err(|_| MetadataError::InvalidPitch(value.to_string()))
    }

    /// Pitch in micrometers per pixel
    pub fn micrometers(&self) -> f64 {
        self.0
    }

    /// Length in pixels of a 1 mm scale bar at this pitch
    pub fn scalebar_length_px(&self) -> Result<u32, LayoutError> {
        scalebar_length_px(self.0)
    }
}

impl FromStr for PixelPitch {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PixelPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} um", self.0)
    }
}

/// Find the pixel pitch value in the text of the metadata document's first page.
///
/// Returns the raw (trimmed) value string. The first line starting with the
/// section marker decides: its value after `": "` if present, otherwise the next
/// line.
pub fn find_pixel_pitch(text: &str) -> Result<String, MetadataError> {
    let lines: Vec<&str> = text.lines().collect();

    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with(PITCH_SECTION_PREFIX) {
            continue;
        }

        if let Some(value) = line.split(VALUE_SEPARATOR).nth(1) {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }

        if let Some(next) = lines.get(index + 1) {
            return Ok(next.trim().to_string());
        }
    }

    Err(MetadataError::PitchNotFound)
}

/// Extract the pixel pitch string from `<folder>/<metadata_file>`.
///
/// Every failure (missing file, unreadable PDF, missing section) is returned as a
/// `MetadataError`; nothing here panics.
pub fn extract_pixel_pitch(folder: &Path, metadata_file: &str) -> Result<String, MetadataError> {
    let pdf_path = folder.join(metadata_file);

    if !pdf_path.is_file() {
        return Err(MetadataError::MissingDocument(pdf_path));
    }

    let document = Document::load(&pdf_path).map_err(|e| MetadataError::UnreadableDocument {
        path: pdf_path.clone(),
        reason: e.to_string(),
    })?;

    // Text of the first page only
    let text = document
        .extract_text(&[1])
        .map_err(|e| MetadataError::UnreadableDocument {
            path: pdf_path.clone(),
            reason: e.to_string(),
        })?;

    log::debug!("Extracted {} characters from {}", text.len(), pdf_path.display());

    find_pixel_pitch(&text)
}

/// Extract and validate the pixel pitch of a specimen folder
pub fn read_pixel_pitch(folder: &Path, metadata_file: &str) -> Result<PixelPitch, MetadataError> {
    let raw = extract_pixel_pitch(folder, metadata_file)?;
    PixelPitch::parse(&raw)
}
