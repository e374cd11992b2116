//! Scale bar module
//!
//! This module handles:
//! - Scale bar options and their defaults (options.rs)
//! - Bar length from pixel pitch and bar/label placement (layout.rs)
//! - Label font loading with a built-in fallback (font.rs)
//! - Drawing the bar and label onto images (render.rs)
//! - The batch task tying it to specimen folders (task.rs)

pub mod font;
pub mod layout;
pub mod options;
pub mod render;
pub mod task;

pub use options::{Corner, TextAlignment, TextPosition};
pub use task::ScaleBarTask;
