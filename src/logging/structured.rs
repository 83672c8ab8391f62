//! Structured logging setup using tracing
//!
//! The event log is an append-only file with one line per event. Console
//! output goes to stderr so that stdout stays free for command output.
//!
//! # Example
//!
//! ```no_run
//! use tessera::logging::init_logging;
//! use tessera::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{Result, TesseraError};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system based on configuration
///
/// This function sets up:
/// - a console layer on stderr (when `console_enabled`)
/// - an append-only file layer at `config.path` (when the path is not empty),
///   written through a non-blocking worker
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Returns
///
/// A `LoggingGuard` that must be kept alive for the duration of the program
///
/// # Errors
///
/// Returns a configuration error for an unknown level, an unusable log path,
/// or when a global subscriber is already installed.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let mut layers = Vec::new();

    if config.console_enabled {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(build_filter(log_level));
        layers.push(console_layer.boxed());
    }

    let file_guard = if config.file_enabled() {
        let (directory, file_name) = split_log_path(&config.path)?;

        std::fs::create_dir_all(&directory).map_err(|e| {
            TesseraError::Configuration(format!(
                "Failed to create log directory {}: {}",
                directory, e
            ))
        })?;

        let file_appender = tracing_appender::rolling::never(&directory, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let base = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_writer(non_blocking);

        let file_layer = if config.format == "json" {
            base.json().with_filter(build_filter(log_level)).boxed()
        } else {
            base.with_filter(build_filter(log_level)).boxed()
        };

        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| {
            TesseraError::Configuration(format!("Failed to install log subscriber: {e}"))
        })?;

    tracing::debug!(
        log_path = %config.path,
        format = %config.format,
        console_enabled = config.console_enabled,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tessera={}", level.as_str().to_lowercase()))
    })
}

/// Splits the log path into the directory to create and the file name
fn split_log_path(path: &str) -> Result<(String, String)> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TesseraError::Configuration(format!(
                "Log path {} does not name a file",
                path.display()
            ))
        })?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };

    Ok((directory, file_name))
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(TesseraError::Configuration(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}
