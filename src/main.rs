use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

mod batch;
mod config;
mod error;
mod logging;
mod metadata;
mod scalebar;
mod sharpen;

use batch::{resolve_specimen_folders, BatchReport, BatchRunner, InputMode, SpecimenTask};
use config::AppConfig;
use error::AppError;
use scalebar::{Corner, ScaleBarTask, TextAlignment, TextPosition};
use sharpen::SharpenTask;

/// Batch scale-bar annotation and sharpening for insect specimen scans
#[derive(Parser, Debug)]
#[command(name = "specimen-scalebar", version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/specimen-scalebar/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Specimen folders processed at the same time
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for the per-run log file
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every batch command
#[derive(Args, Debug)]
struct BatchArgs {
    /// Specimen folder, parent folder or folder list file
    path: PathBuf,

    /// How PATH is interpreted: auto, specimen, parent or list
    #[arg(long)]
    mode: Option<InputMode>,

    /// Write the batch report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a 1 mm scale bar on every specimen image
    Scalebar {
        #[command(flatten)]
        batch: BatchArgs,

        /// bottom_right, bottom_left, top_right or top_left
        #[arg(long)]
        corner: Option<Corner>,

        /// above or below
        #[arg(long)]
        text_position: Option<TextPosition>,

        /// left, center or right
        #[arg(long)]
        text_alignment: Option<TextAlignment>,

        /// Font file name or path
        #[arg(long)]
        font: Option<String>,

        /// Label font size in pixels
        #[arg(long)]
        fontsize: Option<u32>,
    },

    /// Write sharpened copies of every specimen image
    Sharpen {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Print the effective configuration (defaults merged with the config file) as JSON
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(report)) => {
            let mark = if report.is_clean() { "✅" } else { "⚠️ " };
            println!("{} {}", mark, report.summary());
            for skipped in report.skipped_specimens() {
                println!("⚠️  skipped {}", skipped.folder.display());
            }
            for failure in report.failed_images() {
                println!("❌ failed {}: {}", failure.file.display(), failure.reason);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Option<BatchReport>, AppError> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::init(level, cli.log_dir.as_deref())?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(jobs) = cli.jobs {
        config.batch.jobs = jobs;
    }

    match cli.command {
        Command::Scalebar {
            batch,
            corner,
            text_position,
            text_alignment,
            font,
            fontsize,
        } => {
            let scalebar = &mut config.scalebar;
            if let Some(corner) = corner {
                scalebar.corner = corner;
            }
            if let Some(text_position) = text_position {
                scalebar.text_position = text_position;
            }
            if let Some(text_alignment) = text_alignment {
                scalebar.text_alignment = text_alignment;
            }
            if let Some(font) = font {
                scalebar.font_style = font;
            }
            if let Some(fontsize) = fontsize {
                scalebar.fontsize = fontsize;
            }
            config.validate()?;

            let task = ScaleBarTask::new(config.scalebar.clone())?;
            run_batch(task, &batch, &config).map(Some)
        }
        Command::Sharpen { batch } => {
            config.validate()?;
            let task = SharpenTask::new(config.sharpen.clone())?;
            run_batch(task, &batch, &config).map(Some)
        }
        Command::Config => {
            config.validate()?;
            println!("{}", config.to_json().map_err(AppError::PrintConfig)?);
            Ok(None)
        }
    }
}

/// Resolve the input, run the task over every specimen folder and write the report
fn run_batch<T: SpecimenTask>(
    task: T,
    args: &BatchArgs,
    config: &AppConfig,
) -> Result<BatchReport, AppError> {
    let mode = args.mode.unwrap_or(config.batch.mode);
    let folders = resolve_specimen_folders(&args.path, mode)?;
    let jobs = config.batch.jobs;

    let runner = BatchRunner::new(task).with_progress(progress_bar(folders.len()));

    let report = if jobs > 1 {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(jobs)
            .build()
            .map_err(AppError::Runtime)?;
        runtime.block_on(runner.run_concurrent(folders, jobs))
    } else {
        runner.run(&folders)
    };

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }

    Ok(report)
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}") {
        progress.set_style(style);
    }
    progress
}

fn write_report(report: &BatchReport, path: &Path) -> Result<(), AppError> {
    let json = report.to_json().map_err(|e| AppError::Report {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, json).map_err(|source| AppError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("📝 Report written to {}", path.display());
    Ok(())
}
