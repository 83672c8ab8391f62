//! Native GIS engine
//!
//! Reads JSON project documents and GeoJSON sources, writes ESRI Shapefiles.

use super::crs::{CrsRegistry, CRS_DEFINITIONS_FILE};
use super::shapefile::{self, ShapefileError};
use super::{geojson, project};
use crate::adapters::engine::{
    GisEngine, SaveVectorOptions, TransformContext, WriteSummary, SHAPEFILE_DRIVER,
    UTF8_ENCODING,
};
use crate::config::EngineConfig;
use crate::domain::{
    CrsId, EngineError, Layer, Project, VectorDataset, WriteError, WriterErrorCode,
};
use std::path::{Path, PathBuf};

const ENGINE_NAME: &str = "native";

struct EngineState {
    root: PathBuf,
    registry: CrsRegistry,
}

/// Built-in engine backed by this crate's GeoJSON reader and shapefile codec
#[derive(Default)]
pub struct NativeEngine {
    state: Option<EngineState>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`GisEngine::initialize`] has run without a matching shutdown
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn state(&self) -> Result<&EngineState, EngineError> {
        self.state.as_ref().ok_or(EngineError::NotInitialized)
    }
}

impl GisEngine for NativeEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn initialize(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        if self.state.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let root = config.root_buf();
        if !root.is_dir() {
            return Err(EngineError::RootNotFound(root.display().to_string()));
        }

        let mut registry = CrsRegistry::builtin();
        let definitions = root.join(CRS_DEFINITIONS_FILE);
        if definitions.is_file() {
            let added = registry.load_file(&definitions)?;
            tracing::debug!(
                path = %definitions.display(),
                added,
                "Loaded CRS definitions"
            );
        }

        tracing::debug!(root = %root.display(), known_crs = registry.len(), "Native engine ready");
        self.state = Some(EngineState { root, registry });
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        match self.state.take() {
            Some(state) => {
                tracing::debug!(root = %state.root.display(), "Native engine stopped");
                Ok(())
            }
            None => Err(EngineError::NotInitialized),
        }
    }

    fn read_project(&self, path: &Path) -> Result<Project, EngineError> {
        self.state()?;
        project::read_project(path)
    }

    fn write_vector_layer(
        &self,
        layer: &Layer,
        destination: &Path,
        options: &SaveVectorOptions,
        transform: &TransformContext,
    ) -> Result<WriteSummary, WriteError> {
        let state = self
            .state()
            .map_err(|e| WriteError::new(WriterErrorCode::DriverNotFound, e.to_string()))?;

        if options.driver_name != SHAPEFILE_DRIVER {
            return Err(WriteError::new(
                WriterErrorCode::DriverNotFound,
                format!("unknown driver '{}'", options.driver_name),
            ));
        }
        if !options.file_encoding.eq_ignore_ascii_case(UTF8_ENCODING) {
            return Err(WriteError::new(
                WriterErrorCode::CreateLayer,
                format!("unsupported encoding '{}'", options.file_encoding),
            ));
        }
        if !layer.is_vector() {
            return Err(WriteError::new(
                WriterErrorCode::InvalidLayer,
                format!("layer '{}' is a {} layer", layer.name, layer.kind),
            ));
        }
        if transform.requires_reprojection() {
            return Err(WriteError::new(
                WriterErrorCode::Projection,
                "reprojection is not supported",
            ));
        }
        let is_shp = destination
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
        if !is_shp {
            return Err(WriteError::new(
                WriterErrorCode::CreateDataSource,
                format!("{} is not a .shp path", destination.display()),
            ));
        }

        let features = geojson::read_features(&layer.source)
            .map_err(|e| WriteError::new(WriterErrorCode::InvalidLayer, e.to_string()))?;

        let prj = match &transform.destination_crs {
            Some(crs) => Some(state.registry.wkt_for(crs).ok_or_else(|| {
                WriteError::new(
                    WriterErrorCode::Projection,
                    format!("no projection definition for {crs}"),
                )
            })?),
            None => None,
        };

        let today = chrono::Local::now().date_naive();
        let files = shapefile::write(destination, &features, prj, today)
            .map_err(|e| WriteError::new(writer_code(&e), e.to_string()))?;

        Ok(WriteSummary {
            features_written: features.len(),
            files,
        })
    }

    fn read_vector_file(
        &self,
        path: &Path,
        expected_crs: Option<&CrsId>,
    ) -> Result<VectorDataset, EngineError> {
        let state = self.state()?;
        let contents = shapefile::read(path)
            .map_err(|e| EngineError::VectorRead(format!("{}: {}", path.display(), e)))?;

        let crs = contents
            .prj
            .as_deref()
            .and_then(|wkt| state.registry.identify(wkt, expected_crs));

        Ok(VectorDataset::new(crs, contents.features))
    }
}

fn writer_code(error: &ShapefileError) -> WriterErrorCode {
    match error {
        ShapefileError::Io(_) => WriterErrorCode::CreateDataSource,
        ShapefileError::TooManyFields(_) => WriterErrorCode::AttributeCreationFailed,
        ShapefileError::MixedGeometry { .. }
        | ShapefileError::InvalidGeometry(_)
        | ShapefileError::UnsupportedShapeType(_)
        | ShapefileError::ValueOverflow { .. }
        | ShapefileError::FileTooLarge
        | ShapefileError::Malformed(_) => WriterErrorCode::FeatureWriteFailed,
    }
}
