//! Domain error types
//!
//! Errors are split into two channels. [`TesseraError`] covers conditions that
//! abort a run (configuration, engine start-up, output directory creation,
//! project loading). [`LayerExportError`] covers a single layer and is only
//! ever collected into the export summary, never propagated.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main Tessera error type
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The GIS engine could not be initialized
    #[error("Engine initialization failed: {0}")]
    EngineInit(EngineError),

    /// The GIS engine reported an error while shutting down
    #[error("Engine teardown failed: {0}")]
    EngineTeardown(EngineError),

    /// The timestamped output directory could not be created
    #[error("Failed to create output directory {}: {reason}", .path.display())]
    DirectoryCreation { path: PathBuf, reason: String },

    /// The project document could not be loaded
    #[error("Failed to load project file {}: {reason}", .path.display())]
    ProjectLoad { path: PathBuf, reason: String },

    /// Engine errors outside of the start-up and teardown paths
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TesseraError {
    /// Short, stable name of the error class, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            TesseraError::Configuration(_) => "ConfigurationError",
            TesseraError::EngineInit(_) => "EngineInitError",
            TesseraError::EngineTeardown(_) => "EngineTeardownError",
            TesseraError::DirectoryCreation { .. } => "DirectoryCreationError",
            TesseraError::ProjectLoad { .. } => "ProjectLoadError",
            TesseraError::Engine(_) => "EngineError",
            TesseraError::Io(_) => "IoError",
            TesseraError::Serialization(_) => "SerializationError",
        }
    }
}

/// GIS engine errors
///
/// Errors raised by a [`GisEngine`](crate::adapters::engine::GisEngine)
/// implementation. They do not expose the engine's own error types.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The configured engine root does not exist or is not a directory
    #[error("Engine root not found: {0}")]
    RootNotFound(String),

    /// An operation was attempted without an initialized engine
    #[error("Engine is not initialized")]
    NotInitialized,

    /// `initialize` was called on an engine that is already running
    #[error("Engine is already initialized")]
    AlreadyInitialized,

    /// A CRS definition file could not be read or parsed
    #[error("Invalid CRS definitions: {0}")]
    InvalidCrsDefinitions(String),

    /// The project document does not exist
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The project document exists but could not be read
    #[error("Failed to read project: {0}")]
    ProjectUnreadable(String),

    /// The project document is not a valid project
    #[error("Invalid project document: {0}")]
    InvalidProject(String),

    /// A vector dataset could not be read
    #[error("Failed to read vector data: {0}")]
    VectorRead(String),

    /// Generic engine errors
    #[error("{0}")]
    Other(String),
}

/// Status codes reported by the engine's vector writer
///
/// The numeric values are stable and appear in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriterErrorCode {
    /// The requested output driver is not available
    DriverNotFound,
    /// The destination data source could not be created
    CreateDataSource,
    /// The output layer could not be created
    CreateLayer,
    /// An attribute type cannot be represented by the output format
    AttributeTypeUnsupported,
    /// An attribute field could not be created
    AttributeCreationFailed,
    /// The coordinate transform could not be applied
    Projection,
    /// A feature could not be written
    FeatureWriteFailed,
    /// The source layer is not valid
    InvalidLayer,
}

impl WriterErrorCode {
    /// Numeric status code (0 is reserved for "no error")
    pub fn code(self) -> u8 {
        match self {
            WriterErrorCode::DriverNotFound => 1,
            WriterErrorCode::CreateDataSource => 2,
            WriterErrorCode::CreateLayer => 3,
            WriterErrorCode::AttributeTypeUnsupported => 4,
            WriterErrorCode::AttributeCreationFailed => 5,
            WriterErrorCode::Projection => 6,
            WriterErrorCode::FeatureWriteFailed => 7,
            WriterErrorCode::InvalidLayer => 8,
        }
    }

    /// Symbolic status name
    pub fn name(self) -> &'static str {
        match self {
            WriterErrorCode::DriverNotFound => "ErrDriverNotFound",
            WriterErrorCode::CreateDataSource => "ErrCreateDataSource",
            WriterErrorCode::CreateLayer => "ErrCreateLayer",
            WriterErrorCode::AttributeTypeUnsupported => "ErrAttributeTypeUnsupported",
            WriterErrorCode::AttributeCreationFailed => "ErrAttributeCreationFailed",
            WriterErrorCode::Projection => "ErrProjection",
            WriterErrorCode::FeatureWriteFailed => "ErrFeatureWriteFailed",
            WriterErrorCode::InvalidLayer => "ErrInvalidLayer",
        }
    }
}

impl fmt::Display for WriterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Error returned by the engine's vector writer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct WriteError {
    /// Writer status code
    pub code: WriterErrorCode,

    /// Engine-provided message
    pub message: String,
}

impl WriteError {
    /// Creates a new writer error
    pub fn new(code: WriterErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Per-layer export failure
///
/// Recorded in the export summary. A layer failure never aborts the batch.
#[derive(Debug, Clone, Error)]
pub enum LayerExportError {
    /// The writer returned a non-success status
    #[error("writer returned {0}")]
    Writer(WriteError),

    /// The engine faulted (panicked) while converting the layer
    #[error("engine fault: {0}")]
    EngineFault(String),

    /// Another layer already claimed the destination path
    #[error("destination {} is already used by layer '{claimed_by}'", .destination.display())]
    NameCollision {
        destination: PathBuf,
        claimed_by: String,
    },
}

impl LayerExportError {
    /// Engine status label for the event log
    pub fn code_label(&self) -> String {
        match self {
            LayerExportError::Writer(err) => err.code.to_string(),
            LayerExportError::EngineFault(_) => "EngineFault".to_string(),
            LayerExportError::NameCollision { .. } => "NameCollision".to_string(),
        }
    }
}

impl From<WriteError> for LayerExportError {
    fn from(err: WriteError) -> Self {
        LayerExportError::Writer(err)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TesseraError {
    fn from(err: std::io::Error) -> Self {
        TesseraError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        TesseraError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TesseraError {
    fn from(err: toml::de::Error) -> Self {
        TesseraError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tessera_error_display() {
        let err = TesseraError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_project_load_error_display() {
        let err = TesseraError::ProjectLoad {
            path: PathBuf::from("/data/exporter.json"),
            reason: "file does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load project file /data/exporter.json: file does not exist"
        );
        assert_eq!(err.kind(), "ProjectLoadError");
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: TesseraError = EngineError::NotInitialized.into();
        assert!(matches!(err, TesseraError::Engine(EngineError::NotInitialized)));
    }

    #[test]
    fn test_writer_error_code_display() {
        assert_eq!(
            WriterErrorCode::CreateDataSource.to_string(),
            "ErrCreateDataSource (2)"
        );
        assert_eq!(WriterErrorCode::InvalidLayer.code(), 8);
    }

    #[test]
    fn test_layer_export_error_code_label() {
        let err: LayerExportError =
            WriteError::new(WriterErrorCode::Projection, "reprojection requested").into();
        assert_eq!(err.code_label(), "ErrProjection (6)");
        assert!(err.to_string().contains("reprojection requested"));

        let collision = LayerExportError::NameCollision {
            destination: PathBuf::from("out/roads.shp"),
            claimed_by: "roads".to_string(),
        };
        assert_eq!(collision.code_label(), "NameCollision");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TesseraError = io_err.into();
        assert!(matches!(err, TesseraError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TesseraError = toml_err.into();
        assert!(matches!(err, TesseraError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = TesseraError::Io("Test error".to_string());
        let _: &dyn std::error::Error = &err;
        let err = LayerExportError::EngineFault("boom".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
