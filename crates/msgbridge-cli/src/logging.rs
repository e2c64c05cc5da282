//! Tracing setup: compact stdout output plus an append-only log file.
//!
//! The file is written through a non-blocking worker, so a slow or failing
//! disk never holds up request handling. If the file cannot be opened the
//! relay logs to stdout only.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Keeps the file writer flushing. Drop it only at process exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the level; otherwise `info`, or `debug` with
/// `verbose`. Returns the guard and, if the log file could not be opened,
/// the reason (to be logged once the subscriber is live).
pub fn init(log_file: &Path, verbose: bool) -> (LoggingGuard, Option<String>) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, file_guard, file_error) = match open_appender(log_file) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // No ANSI colors in files
                .compact();
            (Some(layer), Some(guard), None)
        }
        Err(reason) => (None, None, Some(reason)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stdout).compact())
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    (LoggingGuard { _file: file_guard }, file_error)
}

/// Open `path` for appending, creating parent directories as needed.
fn open_appender(path: &Path) -> Result<RollingFileAppender, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("invalid log file path: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| format!("cannot open log file {}: {e}", path.display()))
}
