//! Tracing setup for the `rgs` binary.
//!
//! Logs go to a daily rolling file only, never to the terminal the matches are printed on.
//! `RGSCOPE_LOG` takes precedence over the configured level.

use crate::config::LogConfig;

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Keeps the background log writer alive. Dropping it flushes pending lines.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// The directory log files are written to.
pub fn log_dir() -> std::io::Result<PathBuf> {
    let dir = dirs::cache_dir()
        .map(|d| d.join("rgscope").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("rgscope").join("logs"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env("RGSCOPE_LOG")
        .or_else(|_| EnvFilter::try_new(config.level()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns `None` when file logging is off or unavailable.
pub fn init(config: &LogConfig) -> Option<LoggingGuard> {
    if !config.file() {
        return None;
    }

    let log_dir = log_dir()
        .or_else(|_| -> std::io::Result<PathBuf> {
            let dir = std::env::temp_dir().join("rgscope").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
        .ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "rgscope.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(env_filter(config)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}
