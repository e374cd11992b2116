//! Logging setup
//!
//! `log` macros everywhere, log4rs as the backend: a console appender on
//! stderr and, when a log directory is available, one file per run named
//! `information_<YYYY-MM-DD_HH-MM-SS>.log`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::APP_NAME;
use crate::error::LoggingError;

const CONSOLE_PATTERN: &str = "{h({l})}: {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {l}: {m}{n}";

/// Default log directory (e.g. `~/.local/share/specimen-scalebar/logs`)
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join("logs"))
}

/// Log file name for a run started at `started`
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("information_{}.log", started.format("%Y-%m-%d_%H-%M-%S"))
}

/// Build the log4rs configuration
pub fn build_config(level: LevelFilter, log_file: Option<&Path>) -> Result<Config, LoggingError> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(path) = log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(path)
            .map_err(|source| LoggingError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        builder = builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    builder
        .build(root.build(level))
        .map_err(|e| LoggingError::Config(e.to_string()))
}

/// Like `build_config`, but a log file that cannot be opened drops back to the
/// console alone. The file error is returned alongside for reporting.
pub fn build_config_or_console(
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<(Config, Option<LoggingError>), LoggingError> {
    match build_config(level, log_file) {
        Ok(config) => Ok((config, None)),
        Err(e @ LoggingError::LogFile { .. }) => Ok((build_config(level, None)?, Some(e))),
        Err(e) => Err(e),
    }
}

/// Install the global logger. Returns the log file path, if one is in use.
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> Result<Option<PathBuf>, LoggingError> {
    let log_file = log_dir
        .map(Path::to_path_buf)
        .or_else(default_log_dir)
        .map(|dir| dir.join(log_file_name(Local::now())));

    let (config, file_error) = build_config_or_console(level, log_file.as_deref())?;
    log4rs::init_config(config)?;

    if let Some(e) = file_error {
        log::warn!("⚠️  {}. Logging to the console only", e);
        return Ok(None);
    }
    if let Some(path) = &log_file {
        log::debug!("Logging to {}", path.display());
    }
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let started = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(log_file_name(started), "information_2024-03-07_09-05-01.log");
    }

    #[test]
    fn test_build_config_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        let config = build_config(LevelFilter::Debug, Some(&path)).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert!(path.is_file());
    }

    #[test]
    fn test_unwritable_log_dir_falls_back_to_console() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the log directory should be
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("run.log");

        assert!(matches!(
            build_config(LevelFilter::Info, Some(&path)),
            Err(LoggingError::LogFile { .. })
        ));

        let (config, file_error) = build_config_or_console(LevelFilter::Info, Some(&path)).unwrap();
        assert_eq!(config.appenders().len(), 1);
        assert!(matches!(file_error, Some(LoggingError::LogFile { .. })));
    }

    #[test]
    fn test_console_only() {
        let config = build_config(LevelFilter::Info, None).unwrap();
        assert_eq!(config.appenders().len(), 1);
    }
}
