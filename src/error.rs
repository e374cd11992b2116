//! Error types
//!
//! One enum per severity level:
//! - `ConfigError` - caller configuration is invalid, rejected before a batch starts
//! - `MetadataError` / `SpecimenError` - a whole specimen folder is skipped
//! - `LayoutError` / `RenderError` - a single image is skipped
//! - `BatchError` - the batch input itself cannot be resolved
//! - `LoggingError` / `AppError` - the program cannot start

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the pixel pitch from a scan metadata document
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata document not found: {0}")]
    MissingDocument(PathBuf),

    #[error("error reading metadata document {path}: {reason}")]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("object pixel pitch value not found")]
    PitchNotFound,

    #[error("invalid pixel pitch {0:?}: expected a positive number of micrometers")]
    InvalidPitch(String),
}

/// Errors raised while computing scale bar geometry
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("pixel pitch must be a positive finite number, got {0}")]
    InvalidPitch(f64),

    #[error("pixel pitch {0} um gives a scale bar shorter than one pixel")]
    DegenerateBar(f64),

    #[error("scale bar length and height must be at least one pixel")]
    EmptyBar,

    #[error(
        "scale bar annotation ({x}, {y}, {width}x{height}) does not fit inside a {image_width}x{image_height} image"
    )]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Errors raised while processing a single image file
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("refusing to overwrite the input image {0}")]
    SameAsInput(PathBuf),
}

/// Errors that make a whole specimen folder unprocessable
#[derive(Debug, Error)]
pub enum SpecimenError {
    #[error("'{folder}' doesn't contain an `{primary}` or `{fallback}` folder")]
    NoInputFolder {
        folder: PathBuf,
        primary: String,
        fallback: String,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to create output folder {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list images in {path}: {source}")]
    ListImages {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Invalid caller configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown {field} value {value:?} (expected one of: {expected})")]
    UnknownVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors resolving what the batch should process
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input path does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("{path} is not a folder list file")]
    NotAListFile { path: PathBuf },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors setting up the log4rs backend
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid logging configuration: {0}")]
    Config(String),

    #[error("logger already initialised: {0}")]
    Init(#[from] log::SetLoggerError),
}

/// Top-level errors of the command-line program
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to serialize the configuration: {0}")]
    PrintConfig(#[source] serde_json::Error),

    #[error("failed to start the worker runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
