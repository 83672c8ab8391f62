//! Native project document reader
//!
//! A project document is a JSON file:
//!
//! ```json
//! {
//!   "title": "City basemap",
//!   "layers": [
//!     {"id": "roads_01", "name": "roads", "type": "vector",
//!      "crs": "EPSG:4326", "source": "data/roads.geojson"},
//!     {"id": "dem_01", "name": "elevation", "type": "raster",
//!      "crs": "EPSG:4326", "source": "data/dem.tif"}
//!   ]
//! }
//! ```
//!
//! Relative sources resolve against the directory holding the document.

use crate::domain::{CrsId, EngineError, Layer, LayerId, LayerKind, Project};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    layers: Vec<LayerEntry>,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: LayerKind,
    #[serde(default)]
    crs: Option<String>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Reads and validates a project document
///
/// # Errors
///
/// - [`EngineError::ProjectNotFound`] if `path` does not exist
/// - [`EngineError::ProjectUnreadable`] if it cannot be read
/// - [`EngineError::InvalidProject`] if it is not a valid document, or layer
///   ids are empty or repeated
pub fn read_project(path: &Path) -> Result<Project, EngineError> {
    if !path.exists() {
        return Err(EngineError::ProjectNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::ProjectUnreadable(format!("{}: {}", path.display(), e)))?;
    let document: ProjectDocument = serde_json::from_str(&text)
        .map_err(|e| EngineError::InvalidProject(format!("{}: {}", path.display(), e)))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut seen = HashSet::new();
    let mut layers = Vec::with_capacity(document.layers.len());

    for entry in document.layers {
        let id = LayerId::new(entry.id).map_err(EngineError::InvalidProject)?;
        if !seen.insert(id.clone()) {
            return Err(EngineError::InvalidProject(format!(
                "duplicate layer id '{id}'"
            )));
        }

        let crs = entry
            .crs
            .filter(|crs| !crs.trim().is_empty())
            .map(CrsId::new)
            .transpose()
            .map_err(EngineError::InvalidProject)?;

        if let Some(encoding) = entry.encoding.as_deref() {
            if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
                tracing::warn!(
                    layer = %entry.name,
                    encoding,
                    "Source encoding is ignored; GeoJSON sources are read as UTF-8"
                );
            }
        }

        layers.push(Layer::new(
            id,
            entry.name,
            entry.kind,
            crs,
            resolve_source(base_dir, &entry.source),
        ));
    }

    Ok(Project::new(path, document.title, layers))
}

fn resolve_source(base_dir: &Path, source: &str) -> PathBuf {
    let source = Path::new(source);
    if source.is_absolute() || source.as_os_str().is_empty() {
        source.to_path_buf()
    } else {
        base_dir.join(source)
    }
}
