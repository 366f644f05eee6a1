//! Tracing subscriber set-up: JSON lines on stdout plus a daily rolling file.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "microblog";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 10;
const DEFAULT_FILTER: &str = "info";

/// Failures raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rolling file appender error: {0}")]
    Appender(#[from] InitError),
    #[error("tracing subscriber error: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Install the global subscriber writing to stdout and `log_dir`.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard flushes
/// the file writer on drop and must be held until shutdown.
///
/// # Errors
/// Returns [`LoggingError`] when the directory cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}
