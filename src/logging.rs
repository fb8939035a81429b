//! Tracing setup for the screening window and the command-line tools.
//!
//! The window logs to stdout and to a per-launch file under the app folder.
//! The CLIs keep stdout for their report and send diagnostics to stderr.
//! `RUST_LOG` overrides the default level in both cases.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Newest log files kept after a launch.
const KEEP_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "depscreen_";
const LOG_FILE_SUFFIX: &str = ".log";

const FILE_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static INSTALLED: OnceLock<Installed> = OnceLock::new();

/// What stays alive once a subscriber is installed.
enum Installed {
    Window { _file_writer: WorkerGuard },
    Cli,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Window,
    Cli,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    Directory(#[from] AppDirError),
    #[error("Failed to list log directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install logging for the screening window. Repeated calls are no-ops.
///
/// On error the window still opens, just without a log file.
pub fn init() -> Result<(), LoggingError> {
    install(LogTarget::Window)
}

/// Install stderr-only logging for the CLIs, warnings and above by default.
pub fn init_stderr() -> Result<(), LoggingError> {
    install(LogTarget::Cli)
}

fn install(target: LogTarget) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let installed = match target {
        LogTarget::Window => install_window()?,
        LogTarget::Cli => {
            let subscriber = Registry::default()
                .with(env_filter("warn"))
                .with(fmt::layer().with_timer(line_timer()).with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
            Installed::Cli
        }
    };
    let _ = INSTALLED.set(installed);
    Ok(())
}

fn install_window() -> Result<Installed, LoggingError> {
    let dir = app_dirs::logs_dir()?;
    let file_name = log_file_name(now_local_or_utc())?;
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, &file_name));
    let removed = prune_old_logs(&dir, KEEP_LOG_FILES)?;

    let subscriber = Registry::default()
        .with(env_filter("info"))
        .with(fmt::layer().with_timer(line_timer()).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(line_timer())
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::info!(
        removed,
        "Logging to {}",
        dir.join(&file_name).display()
    );
    Ok(Installed::Window {
        _file_writer: guard,
    })
}

/// Delete all but the `keep` newest depscreen log files; returns how many went.
///
/// File names carry a sortable timestamp, so name order is age order.
fn prune_old_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let listing = fs::read_dir(dir).map_err(|source| LoggingError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<PathBuf> = listing
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_log_file(path))
        .collect();
    logs.sort();
    let excess = logs.len().saturating_sub(keep);
    for path in logs.drain(..excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Prune { path, source })?;
    }
    Ok(excess)
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX))
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!(
        "{LOG_FILE_PREFIX}{}{LOG_FILE_SUFFIX}",
        now.format(FILE_STAMP)?
    ))
}

fn line_timer() -> fmt::time::OffsetTime<&'static [FormatItem<'static>]> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP)
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}
