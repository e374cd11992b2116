//! Sharpening module
//!
//! This module handles:
//! - Sharpening options and their defaults (options.rs)
//! - Unsharp mask and high-pass overlay filters (filter.rs)
//! - The batch task writing sharpened copies of specimen images (task.rs)

pub mod filter;
pub mod options;
pub mod task;

pub use options::SharpenConfig;
pub use task::SharpenTask;
