//! Per-layer export job

use crate::adapters::engine::{SaveVectorOptions, TransformContext};
use crate::domain::Layer;
use std::path::PathBuf;

/// One vector layer conversion
///
/// Built right before the writer is invoked and dropped right after.
#[derive(Debug, Clone)]
pub struct ExportJob<'a> {
    pub layer: &'a Layer,
    pub destination: PathBuf,
    pub options: SaveVectorOptions,
    pub transform: TransformContext,
}

impl<'a> ExportJob<'a> {
    /// Shapefile job with UTF-8 attributes that keeps the layer's CRS
    pub fn for_layer(layer: &'a Layer, destination: PathBuf) -> Self {
        Self {
            layer,
            destination,
            options: SaveVectorOptions::shapefile(),
            transform: TransformContext::identity(layer.crs.clone()),
        }
    }
}
