//! Tracing setup for the Caseflow runner.
//!
//! Two sinks: a daily-rolled file under `~/.caseflow/logs` that keeps the
//! per-row audit trail (`caseflow_worker` at debug), and stderr for operators
//! at info. Worker events are emitted inside a `task` span carrying
//! `task_id` and `file_upload_seq`, so every line in the file names its task.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Row outcomes are logged at debug by the worker; the file keeps them.
pub const FILE_LOG_FILTER: &str = "caseflow=info,caseflow_worker=debug,caseflow_db=info,sqlx=warn";
pub const CONSOLE_LOG_FILTER: &str = "caseflow=info,caseflow_worker=info,caseflow_db=warn,sqlx=warn";
const VERBOSE_LOG_FILTER: &str = "caseflow=debug,caseflow_worker=debug,caseflow_db=debug,sqlx=info";

/// Daily files kept before the oldest is removed.
pub const MAX_LOG_FILES: usize = 14;

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Overrides ~/.caseflow/logs.
    pub log_dir: Option<PathBuf>,
}

/// Keeps the background file writer alive. Drop it last so buffered lines
/// reach disk.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Install the file and stderr layers. `RUST_LOG` overrides both filters.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let log_dir = match config.log_dir {
        Some(dir) => dir,
        None => logs_dir(),
    };
    let appender = file_appender(&log_dir, config.app_name)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter_for(FILE_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter(config.verbose)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

/// ~/.caseflow/logs
pub fn logs_dir() -> PathBuf {
    caseflow_protocol::paths::caseflow_home().join("logs")
}

/// Daily-rolled `<app>.YYYY-MM-DD.log` files in `dir`.
pub fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        filter_for(CONSOLE_LOG_FILTER)
    }
}

fn filter_for(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_appender_writes_prefixed_daily_file() {
        let tmp = TempDir::new().unwrap();
        let log_dir = tmp.path().join("logs");
        let mut appender = file_appender(&log_dir, "caseflow").unwrap();
        appender.write_all(b"task_id=1 row=2 Row rejected\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("caseflow."));
        assert!(names[0].ends_with(".log"));
    }

    #[test]
    fn test_filters_keep_row_audit_in_file_only() {
        assert!(FILE_LOG_FILTER.contains("caseflow_worker=debug"));
        assert!(CONSOLE_LOG_FILTER.contains("caseflow_worker=info"));
        for filter in [FILE_LOG_FILTER, CONSOLE_LOG_FILTER, VERBOSE_LOG_FILTER] {
            assert!(filter.parse::<EnvFilter>().is_ok(), "{}", filter);
        }
    }
}
