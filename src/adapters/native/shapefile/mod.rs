//! ESRI Shapefile codec
//!
//! A shapefile is a set of sibling files sharing one stem:
//!
//! | file   | content                                  |
//! |--------|------------------------------------------|
//! | `.shp` | geometry records                         |
//! | `.shx` | record offsets into `.shp`               |
//! | `.dbf` | attribute table (dBase III)              |
//! | `.cpg` | attribute encoding, always `UTF-8`       |
//! | `.prj` | CRS as ESRI WKT, when the CRS is known   |

pub mod dbf;
pub mod shp;

use crate::domain::{Feature, Geometry};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use shp::ShapeType;

/// Shapefile encoding and decoding errors
#[derive(Debug, Error)]
pub enum ShapefileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mixed geometry types: layer has {expected}, found {found}")]
    MixedGeometry { expected: String, found: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("unsupported shape type {0}")]
    UnsupportedShapeType(i32),

    #[error("{0} attribute fields exceed the dBase limit of 255")]
    TooManyFields(usize),

    #[error("value '{value}' does not fit field {field}")]
    ValueOverflow { field: String, value: String },

    #[error("file exceeds the shapefile size limit")]
    FileTooLarge,

    #[error("malformed shapefile: {0}")]
    Malformed(String),
}

/// Contents of a shapefile set read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileContents {
    pub shape_type: ShapeType,
    pub features: Vec<Feature>,
    /// `.prj` text, if present
    pub prj: Option<String>,
}

/// Path of the sibling file with extension `ext`
pub fn sidecar(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Writes `features` as a shapefile set at `destination` (the `.shp` path)
///
/// Existing files are replaced. A stale `.prj` is removed when `prj_wkt` is
/// `None`. Returns the files written, `.shp` first.
pub fn write(
    destination: &Path,
    features: &[Feature],
    prj_wkt: Option<&str>,
    date: NaiveDate,
) -> Result<Vec<PathBuf>, ShapefileError> {
    let shape_type =
        ShapeType::for_geometries(features.iter().map(|feature| feature.geometry.as_ref()))?;
    let geometries: Vec<Option<&Geometry>> =
        features.iter().map(|feature| feature.geometry.as_ref()).collect();

    let shapes = shp::encode(shape_type, &geometries)?;
    let fields = dbf::infer_fields(features)?;
    let table = dbf::encode(&fields, features, date)?;

    let shx_path = sidecar(destination, "shx");
    let dbf_path = sidecar(destination, "dbf");
    let cpg_path = sidecar(destination, "cpg");
    let prj_path = sidecar(destination, "prj");

    fs::write(destination, &shapes.shp)?;
    fs::write(&shx_path, &shapes.shx)?;
    fs::write(&dbf_path, &table)?;
    fs::write(&cpg_path, "UTF-8")?;

    let mut files = vec![destination.to_path_buf(), shx_path, dbf_path, cpg_path];
    match prj_wkt {
        Some(wkt) => {
            fs::write(&prj_path, wkt)?;
            files.push(prj_path);
        }
        None if prj_path.is_file() => fs::remove_file(&prj_path)?,
        None => {}
    }

    tracing::debug!(
        destination = %destination.display(),
        shape_type = ?shape_type,
        records = features.len(),
        fields = fields.len(),
        "Wrote shapefile"
    );

    Ok(files)
}

/// Reads a shapefile set from its `.shp` path
///
/// The `.dbf` and `.prj` sidecars are optional.
pub fn read(path: &Path) -> Result<ShapefileContents, ShapefileError> {
    let (shape_type, geometries) = shp::decode(&fs::read(path)?)?;

    let dbf_path = sidecar(path, "dbf");
    let mut records = if dbf_path.is_file() {
        dbf::decode(&fs::read(&dbf_path)?)?.records
    } else {
        Vec::new()
    };
    if !records.is_empty() && records.len() != geometries.len() {
        return Err(ShapefileError::Malformed(format!(
            "{} shapes but {} attribute records",
            geometries.len(),
            records.len()
        )));
    }
    records.resize_with(geometries.len(), Vec::new);

    let prj_path = sidecar(path, "prj");
    let prj = if prj_path.is_file() {
        Some(fs::read_to_string(&prj_path)?)
    } else {
        None
    };

    let features = geometries
        .into_iter()
        .zip(records)
        .map(|(geometry, attributes)| Feature::new(geometry, attributes))
        .collect();

    Ok(ShapefileContents {
        shape_type,
        features,
        prj,
    })
}
