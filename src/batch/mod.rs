//! Batch orchestration module
//!
//! This module handles:
//! - Resolving the input path into specimen folders (input.rs, folder_list.rs)
//! - Specimen folder conventions: edof/redof, output folders, image files (specimen.rs)
//! - Running a task over every specimen folder with failure isolation (runner.rs)
//! - Summarizing what was processed and what was skipped (report.rs)

pub mod folder_list;
pub mod input;
pub mod report;
pub mod runner;
pub mod specimen;

pub use input::{resolve_specimen_folders, InputMode};
pub use report::BatchReport;
pub use runner::{BatchRunner, SpecimenTask};
