//! Native engine implementation
//!
//! - [`engine`] - [`NativeEngine`], the [`GisEngine`](crate::adapters::engine::GisEngine) implementation
//! - [`project`] - JSON project documents
//! - [`geojson`] - GeoJSON layer sources
//! - [`shapefile`] - ESRI Shapefile codec
//! - [`crs`] - CRS identifier to WKT registry

pub mod crs;
pub mod engine;
pub mod geojson;
pub mod project;
pub mod shapefile;

pub use crs::CrsRegistry;
pub use engine::NativeEngine;
