//! Logging setup.
//!
//! Console output goes to stderr. File output goes to `run.log` inside the
//! configured directory; the previous session's `run.log` is archived as
//! `rollup-driver.YYYY-MM-DD.HHMMSS.log` on startup and the oldest archives beyond
//! the configured limit are removed.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DriverConfig;
use crate::error::{LoggingError, LoggingResult};

const ARCHIVE_PREFIX: &str = "rollup-driver.";
const ACTIVE_LOG_NAME: &str = "run.log";
const MAX_SAME_SECOND_ARCHIVES: usize = 999;

/// Flushes buffered file output when dropped. Keep it alive for the whole run.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit level; `RUST_LOG` (or INFO) applies when None.
    pub level: Option<LevelFilter>,
    pub console: bool,
    pub file: Option<LogFileConfig>,
}

#[derive(Debug, Clone)]
pub struct LogFileConfig {
    pub log_dir: PathBuf,
    /// Archived sessions to keep next to `run.log`.
    pub max_files: usize,
}

impl DriverConfig {
    /// Console logging, plus file logging when a log directory is configured.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            console: true,
            file: self.log_dir.as_ref().map(|dir| LogFileConfig {
                log_dir: dir.clone(),
                max_files: self.max_log_files,
            }),
        }
    }
}

/// Install the global tracing subscriber.
///
/// With neither console nor file output nothing is installed and tracing
/// macros stay no-ops. Fails if a global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingGuard> {
    if !config.console && config.file.is_none() {
        return Ok(LoggingGuard {
            _worker_guard: None,
        });
    }

    let env_filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string())),
    };

    let mut worker_guard = None;
    let file_layer = match &config.file {
        Some(file_config) => {
            let (writer, guard) = open_log_file(file_config)?;
            worker_guard = Some(guard);
            Some(fmt::layer().with_target(true).with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    let console_layer = config
        .console
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))?;

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
    })
}

fn open_log_file(config: &LogFileConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.log_dir)?;
    archive_active_log(&config.log_dir)?;
    prune_archives(&config.log_dir, config.max_files)?;

    let file = File::create(config.log_dir.join(ACTIVE_LOG_NAME))?;
    Ok(tracing_appender::non_blocking(file))
}

fn archive_name(timestamp: &DateTime<Local>, attempt: usize) -> String {
    let stamp = timestamp.format("%Y-%m-%d.%H%M%S");
    if attempt == 0 {
        format!("{}{}.log", ARCHIVE_PREFIX, stamp)
    } else {
        format!("{}{}-{}.log", ARCHIVE_PREFIX, stamp, attempt)
    }
}

fn is_archive(file_name: &str) -> bool {
    file_name.starts_with(ARCHIVE_PREFIX) && file_name.ends_with(".log")
}

/// Move an existing `run.log` aside, named after its modification time.
fn archive_active_log(log_dir: &Path) -> LoggingResult<()> {
    let active = log_dir.join(ACTIVE_LOG_NAME);
    if !active.exists() {
        return Ok(());
    }

    let modified: DateTime<Local> = fs::metadata(&active)
        .and_then(|metadata| metadata.modified())
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    let target = (0..=MAX_SAME_SECOND_ARCHIVES)
        .map(|attempt| log_dir.join(archive_name(&modified, attempt)))
        .find(|path| !path.exists())
        .ok_or_else(|| {
            LoggingError::RotationFailed(format!(
                "more than {} archives for {}",
                MAX_SAME_SECOND_ARCHIVES,
                modified.format("%Y-%m-%d.%H%M%S")
            ))
        })?;

    fs::rename(&active, &target).map_err(|e| LoggingError::RotationFailed(e.to_string()))
}

/// Delete the oldest archives until at most `keep` remain. `run.log` is never touched.
fn prune_archives(log_dir: &Path, keep: usize) -> LoggingResult<()> {
    let entries = fs::read_dir(log_dir)
        .map_err(|e| LoggingError::RotationFailed(format!("failed to read log dir: {}", e)))?;

    let mut archives: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_archive))
        .map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok();
            (modified, entry.path())
        })
        .collect();

    if archives.len() <= keep {
        return Ok(());
    }

    // Oldest first; ties fall back to the name, which embeds the timestamp
    archives.sort();

    let excess = archives.len() - keep;
    for (_, path) in archives.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("Failed to remove old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}
