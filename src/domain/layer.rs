//! Project and layer domain models

use super::ids::{CrsId, LayerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Closed set of layer kinds, fixed when the project is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Discrete features (points, lines, polygons) with attributes
    Vector,
    /// Gridded pixel data
    Raster,
    /// Anything else the project may contain (mesh, point cloud, plugin layers)
    #[serde(other)]
    Other,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LayerKind::Vector => "vector",
            LayerKind::Raster => "raster",
            LayerKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A named dataset defined in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier within the project
    pub id: LayerId,

    /// Display name; not necessarily unique
    pub name: String,

    /// Layer kind
    pub kind: LayerKind,

    /// Coordinate reference system, if the project declares one
    pub crs: Option<CrsId>,

    /// Data source, resolved to an absolute or project-relative path
    pub source: PathBuf,
}

impl Layer {
    /// Creates a layer
    pub fn new(
        id: LayerId,
        name: impl Into<String>,
        kind: LayerKind,
        crs: Option<CrsId>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            crs,
            source: source.into(),
        }
    }

    /// Whether this layer is part of a vector export
    pub fn is_vector(&self) -> bool {
        matches!(self.kind, LayerKind::Vector)
    }

    /// CRS identifier for log lines, `unknown` when the layer has none
    pub fn crs_label(&self) -> &str {
        self.crs.as_ref().map(CrsId::as_str).unwrap_or("unknown")
    }
}

/// An on-disk project document and its layer collection
///
/// The layer collection is a snapshot taken at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Path the project was loaded from
    pub path: PathBuf,

    /// Optional project title
    pub title: Option<String>,

    /// Layers in document order
    pub layers: Vec<Layer>,
}

impl Project {
    /// Creates a project snapshot
    pub fn new(path: impl Into<PathBuf>, title: Option<String>, layers: Vec<Layer>) -> Self {
        Self {
            path: path.into(),
            title,
            layers,
        }
    }

    /// Path the project was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All layers in iteration order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers of the given kind
    pub fn count_of(&self, kind: LayerKind) -> usize {
        self.layers.iter().filter(|layer| layer.kind == kind).count()
    }

    /// Whether the project has no layers at all
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
