//! Batch runner
//!
//! Runs one `SpecimenTask` over a list of specimen folders. Every specimen
//! folder and every image is an isolated unit of work: a failure (or panic)
//! in one is recorded in the report and the batch moves on.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tokio::task::JoinSet;

use crate::batch::report::{BatchReport, ImageFailure, SpecimenOutcome, SpecimenStatus};
use crate::batch::specimen::{list_images, output_folder_for, InputFolders};
use crate::error::{RenderError, SpecimenError};

/// A per-image operation applied to every specimen folder of a batch
pub trait SpecimenTask: Send + Sync + 'static {
    /// Per-specimen state computed once before its images are processed
    type Prepared: Send;

    /// Short task name used in logs and reports
    fn name(&self) -> &'static str;

    /// Image subfolder names to try
    fn input_folders(&self) -> &InputFolders;

    /// Suffix appended to the input folder name to form the output folder
    fn output_suffix(&self) -> &str;

    /// Per-specimen preparation. An error skips the whole specimen folder.
    fn prepare(&self, specimen: &Path, input_folder: &Path) -> Result<Self::Prepared, SpecimenError>;

    /// Process one image. An error skips only this image.
    fn process_image(
        &self,
        prepared: &Self::Prepared,
        input: &Path,
        output: &Path,
    ) -> Result<(), RenderError>;
}

/// Runs a task over specimen folders and collects a `BatchReport`
pub struct BatchRunner<T: SpecimenTask> {
    task: Arc<T>,
    progress: Option<ProgressBar>,
}

impl<T: SpecimenTask> BatchRunner<T> {
    pub fn new(task: T) -> Self {
        Self {
            task: Arc::new(task),
            progress: None,
        }
    }

    /// Advance `progress` by one after each specimen folder
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process the folders one after another on the current thread
    pub fn run(&self, folders: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::new(self.task.name());
        log::info!("🔍 {}: {} specimen folders", self.task.name(), folders.len());

        for folder in folders {
            let outcome = process_specimen_guarded(self.task.as_ref(), folder);
            self.advance(&outcome);
            report.record(outcome);
        }

        self.finish(report)
    }

    /// Process up to `jobs` specimen folders at a time on tokio's blocking pool.
    ///
    /// Outcomes are recorded in completion order.
    pub async fn run_concurrent(&self, folders: Vec<PathBuf>, jobs: usize) -> BatchReport {
        let mut report = BatchReport::new(self.task.name());
        log::info!(
            "🔍 {}: {} specimen folders, {} workers",
            self.task.name(),
            folders.len(),
            jobs.max(1)
        );

        let mut pending = folders.into_iter();
        let mut running = JoinSet::new();

        for folder in pending.by_ref().take(jobs.max(1)) {
            self.spawn(&mut running, folder);
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok(outcome) => {
                    self.advance(&outcome);
                    report.record(outcome);
                }
                // Panics are caught inside the worker, so this is cancellation only
                Err(e) => log::error!("❌ Worker task failed: {}", e),
            }

            if let Some(folder) = pending.next() {
                self.spawn(&mut running, folder);
            }
        }

        self.finish(report)
    }

    fn spawn(&self, running: &mut JoinSet<SpecimenOutcome>, folder: PathBuf) {
        let task = Arc::clone(&self.task);
        running.spawn_blocking(move || process_specimen_guarded(task.as_ref(), &folder));
    }

    fn advance(&self, outcome: &SpecimenOutcome) {
        if let Some(progress) = &self.progress {
            progress.set_message(outcome.folder.display().to_string());
            progress.inc(1);
        }
    }

    fn finish(&self, report: BatchReport) -> BatchReport {
        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }
        let report = report.finish();
        log::info!("✅ {}", report.summary());
        report
    }
}

/// Process one specimen folder, turning a panic into a skipped outcome
pub fn process_specimen_guarded<T: SpecimenTask>(task: &T, specimen: &Path) -> SpecimenOutcome {
    match catch_unwind(AssertUnwindSafe(|| process_specimen(task, specimen))) {
        Ok(outcome) => outcome,
        Err(panic) => {
            let reason = format!("processing panicked: {}", panic_message(panic.as_ref()));
            log::error!("❌ {}: {}", specimen.display(), reason);
            SpecimenOutcome::skipped(specimen, reason)
        }
    }
}

/// Process one specimen folder
///
/// Steps:
/// 1. Select the input image folder (primary, then fallback)
/// 2. Run the task's per-specimen preparation
/// 3. Create the output folder (idempotent)
/// 4. Process every image, recording failures per file
pub fn process_specimen<T: SpecimenTask>(task: &T, specimen: &Path) -> SpecimenOutcome {
    log::info!("📁 Starting folder: {}", specimen.display());

    let prepared = match prepare_specimen(task, specimen) {
        Ok(prepared) => prepared,
        Err(e) => {
            log::warn!("⚠️  Skipping {}: {}", specimen.display(), e);
            return SpecimenOutcome::skipped(specimen, e);
        }
    };
    let (input_folder, output_folder, images, state) = prepared;

    log::debug!("Input Folder: {}", input_folder.display());
    log::debug!("Output Folder: {}", output_folder.display());

    let mut processed = Vec::new();
    let mut failed = Vec::new();

    for image in images {
        let Some(file_name) = image.file_name() else {
            continue;
        };
        let output = output_folder.join(file_name);

        let result = catch_unwind(AssertUnwindSafe(|| task.process_image(&state, &image, &output)));
        match result {
            Ok(Ok(())) => processed.push(output),
            Ok(Err(e)) => {
                log::error!("❌ {}: {}", image.display(), e);
                failed.push(ImageFailure {
                    file: image,
                    reason: e.to_string(),
                });
            }
            Err(panic) => {
                let reason = format!("processing panicked: {}", panic_message(panic.as_ref()));
                log::error!("❌ {}: {}", image.display(), reason);
                failed.push(ImageFailure { file: image, reason });
            }
        }
    }

    log::info!(
        "📊 {}: {} images written, {} failed",
        specimen.display(),
        processed.len(),
        failed.len()
    );

    SpecimenOutcome {
        folder: specimen.to_path_buf(),
        status: SpecimenStatus::Processed {
            input_folder,
            output_folder,
            processed,
            failed,
        },
    }
}

type PreparedSpecimen<P> = (PathBuf, PathBuf, Vec<PathBuf>, P);

fn prepare_specimen<T: SpecimenTask>(
    task: &T,
    specimen: &Path,
) -> Result<PreparedSpecimen<T::Prepared>, SpecimenError> {
    let input_folder = task.input_folders().select(specimen)?;
    let state = task.prepare(specimen, &input_folder)?;

    let output_folder = output_folder_for(&input_folder, task.output_suffix());
    std::fs::create_dir_all(&output_folder).map_err(|source| SpecimenError::CreateOutput {
        path: output_folder.clone(),
        source,
    })?;

    let images = list_images(&input_folder)?;
    Ok((input_folder, output_folder, images, state))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
