//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - An append-only event log file (text or JSON lines)
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Console mirroring on stderr
//!
//! # Example
//!
//! ```no_run
//! use tessera::logging::init_logging;
//! use tessera::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(layer = "roads", "Exported vector layer");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a successfully exported layer
///
/// # Example
///
/// ```no_run
/// use tessera::log_layer_exported;
/// use std::path::Path;
///
/// log_layer_exported!("roads", "EPSG:4326", Path::new("output/roads.shp"), 120);
/// ```
#[macro_export]
macro_rules! log_layer_exported {
    ($layer:expr, $crs:expr, $destination:expr, $features:expr) => {
        tracing::info!(
            layer = %$layer,
            crs = %$crs,
            destination = %$destination.display(),
            features = $features,
            "Exported vector layer"
        );
    };
}

/// Log a layer whose conversion failed
///
/// # Example
///
/// ```no_run
/// use tessera::log_layer_failed;
/// use tessera::domain::{LayerExportError, WriteError, WriterErrorCode};
///
/// let error: LayerExportError =
///     WriteError::new(WriterErrorCode::CreateDataSource, "permission denied").into();
/// log_layer_failed!("roads", &error);
/// ```
#[macro_export]
macro_rules! log_layer_failed {
    ($layer:expr, $error:expr) => {
        tracing::error!(
            layer = %$layer,
            code = %$error.code_label(),
            error = %$error,
            "Failed to export vector layer"
        );
    };
}

/// Log an error that aborts the run
///
/// # Example
///
/// ```no_run
/// use tessera::log_run_aborted;
/// use tessera::domain::TesseraError;
///
/// let error = TesseraError::Configuration("Invalid config".to_string());
/// log_run_aborted!(&error);
/// ```
#[macro_export]
macro_rules! log_run_aborted {
    ($error:expr) => {
        tracing::error!(
            kind = $error.kind(),
            error = %$error,
            "Export run aborted"
        );
    };
}
