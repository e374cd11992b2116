//! Scan metadata module
//!
//! This module handles:
//! - Reading the scanner's metadata document (`ScanInformation.pdf`)
//! - Extracting the object pixel pitch from its first page
//! - Validating the pitch before any scale bar is computed

pub mod pitch;

pub use pitch::{read_pixel_pitch, PixelPitch};

/// Default file name of the scan metadata document inside a specimen folder
pub const DEFAULT_METADATA_FILE: &str = "ScanInformation.pdf";
