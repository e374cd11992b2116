//! Batch report
//!
//! Records what happened to every specimen folder and image so the summary can
//! tell processed units apart from skipped ones.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An image that could not be processed
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub file: PathBuf,
    pub reason: String,
}

/// What happened to one specimen folder
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpecimenStatus {
    Processed {
        input_folder: PathBuf,
        output_folder: PathBuf,
        processed: Vec<PathBuf>,
        failed: Vec<ImageFailure>,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SpecimenOutcome {
    pub folder: PathBuf,
    #[serde(flatten)]
    pub status: SpecimenStatus,
}

impl SpecimenOutcome {
    pub fn skipped(folder: &Path, reason: impl ToString) -> Self {
        Self {
            folder: folder.to_path_buf(),
            status: SpecimenStatus::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, SpecimenStatus::Skipped { .. })
    }

    pub fn processed_images(&self) -> usize {
        match &self.status {
            SpecimenStatus::Processed { processed, .. } => processed.len(),
            SpecimenStatus::Skipped { .. } => 0,
        }
    }

    pub fn failed_images(&self) -> &[ImageFailure] {
        match &self.status {
            SpecimenStatus::Processed { failed, .. } => failed,
            SpecimenStatus::Skipped { .. } => &[],
        }
    }
}

/// Summary of a whole batch run
#[derive(Serialize, Debug, Clone)]
pub struct BatchReport {
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub specimens: Vec<SpecimenOutcome>,
}

impl BatchReport {
    pub fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            specimens: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: SpecimenOutcome) {
        self.specimens.push(outcome);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn processed_specimens(&self) -> usize {
        self.specimens.iter().filter(|s| !s.is_skipped()).count()
    }

    pub fn skipped_specimens(&self) -> impl Iterator<Item = &SpecimenOutcome> {
        self.specimens.iter().filter(|s| s.is_skipped())
    }

    pub fn processed_images(&self) -> usize {
        self.specimens.iter().map(|s| s.processed_images()).sum()
    }

    pub fn failed_images(&self) -> impl Iterator<Item = &ImageFailure> {
        self.specimens.iter().flat_map(|s| s.failed_images())
    }

    /// True when nothing was skipped and no image failed
    pub fn is_clean(&self) -> bool {
        self.skipped_specimens().next().is_none() && self.failed_images().next().is_none()
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{}: {} specimen folders processed, {} skipped; {} images written, {} failed",
            self.task,
            self.processed_specimens(),
            self.skipped_specimens().count(),
            self.processed_images(),
            self.failed_images().count()
        )
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processed(folder: &str, images: usize, failures: usize) -> SpecimenOutcome {
        SpecimenOutcome {
            folder: PathBuf::from(folder),
            status: SpecimenStatus::Processed {
                input_folder: PathBuf::from(folder).join("redof"),
                output_folder: PathBuf::from(folder).join("redof_scalebar"),
                processed: (0..images).map(|i| PathBuf::from(format!("{i}.jpg"))).collect(),
                failed: (0..failures)
                    .map(|i| ImageFailure {
                        file: PathBuf::from(format!("bad{i}.jpg")),
                        reason: "corrupt".to_string(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_counts() {
        let mut report = BatchReport::new("scalebar");
        report.record(processed("a", 3, 1));
        report.record(SpecimenOutcome::skipped(Path::new("b"), "no redof folder"));
        report.record(processed("c", 2, 0));
        let report = report.finish();

        assert_eq!(report.processed_specimens(), 2);
        assert_eq!(report.skipped_specimens().count(), 1);
        assert_eq!(report.processed_images(), 5);
        assert_eq!(report.failed_images().count(), 1);
        assert!(!report.is_clean());
        assert!(report.finished_at.is_some());
        assert_eq!(
            report.summary(),
            "scalebar: 2 specimen folders processed, 1 skipped; 5 images written, 1 failed"
        );
    }

    #[test]
    fn test_json_shape() {
        let mut report = BatchReport::new("sharpen");
        report.record(SpecimenOutcome::skipped(Path::new("b"), "no edof folder"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["task"], "sharpen");
        assert_eq!(json["specimens"][0]["status"], "skipped");
        assert_eq!(json["specimens"][0]["reason"], "no edof folder");
        assert_eq!(json["specimens"][0]["folder"], "b");
    }
}
