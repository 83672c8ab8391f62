//! GIS engine abstraction traits
//!
//! This module defines the boundary the export pipeline uses to reach a
//! geospatial runtime. Implementations must not leak their own error types.

use crate::config::EngineConfig;
use crate::domain::{CrsId, EngineError, Layer, Project, VectorDataset, WriteError};
use std::path::{Path, PathBuf};

/// Driver name of the only supported output format
pub const SHAPEFILE_DRIVER: &str = "ESRI Shapefile";

/// Attribute encoding written to every output file
pub const UTF8_ENCODING: &str = "UTF-8";

/// Options passed to the vector writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveVectorOptions {
    /// Output driver name
    pub driver_name: String,

    /// Attribute encoding
    pub file_encoding: String,
}

impl SaveVectorOptions {
    /// Shapefile output with UTF-8 attributes
    pub fn shapefile() -> Self {
        Self {
            driver_name: SHAPEFILE_DRIVER.to_string(),
            file_encoding: UTF8_ENCODING.to_string(),
        }
    }
}

impl Default for SaveVectorOptions {
    fn default() -> Self {
        Self::shapefile()
    }
}

/// Coordinate transform applied while writing
///
/// A context built by [`TransformContext::identity`] keeps the source CRS.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformContext {
    /// CRS of the source layer
    pub source_crs: Option<CrsId>,

    /// CRS of the written file
    pub destination_crs: Option<CrsId>,
}

impl TransformContext {
    /// No-reprojection context for a layer in `crs`
    pub fn identity(crs: Option<CrsId>) -> Self {
        Self {
            source_crs: crs.clone(),
            destination_crs: crs,
        }
    }

    /// Whether writing through this context would change coordinates
    pub fn requires_reprojection(&self) -> bool {
        match (&self.source_crs, &self.destination_crs) {
            (Some(source), Some(destination)) => source != destination,
            (None, None) => false,
            _ => true,
        }
    }
}

/// Result of a successful vector write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteSummary {
    /// Number of features written
    pub features_written: usize,

    /// Files created or replaced, main file first
    pub files: Vec<PathBuf>,
}

/// GIS engine trait
///
/// One value owns one geospatial runtime. [`initialize`](Self::initialize)
/// and [`shutdown`](Self::shutdown) bracket every other call; use
/// [`EngineSession`](super::EngineSession) instead of calling them directly.
pub trait GisEngine {
    /// Engine name for log lines
    fn name(&self) -> &str;

    /// Initializes the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the engine root is unusable or the engine is
    /// already running.
    fn initialize(&mut self, config: &EngineConfig) -> Result<(), EngineError>;

    /// Releases the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails; the engine is considered released
    /// either way.
    fn shutdown(&mut self) -> Result<(), EngineError>;

    /// Reads a project document and snapshots its layer collection
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing, unreadable or invalid.
    fn read_project(&self, path: &Path) -> Result<Project, EngineError>;

    /// Writes one vector layer to `destination`
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] carrying the writer status code.
    fn write_vector_layer(
        &self,
        layer: &Layer,
        destination: &Path,
        options: &SaveVectorOptions,
        transform: &TransformContext,
    ) -> Result<WriteSummary, WriteError>;

    /// Reads back a vector file written by [`write_vector_layer`](Self::write_vector_layer)
    ///
    /// `expected_crs` resolves a projection definition shared by several
    /// identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the file set cannot be read.
    fn read_vector_file(
        &self,
        path: &Path,
        expected_crs: Option<&CrsId>,
    ) -> Result<VectorDataset, EngineError>;
}
