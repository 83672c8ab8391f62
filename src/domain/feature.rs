//! Vector feature model
//!
//! Two-dimensional geometries with ordered attributes. Z and M values are not
//! carried.

use super::ids::CrsId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Feature geometry
///
/// Polygons are a list of rings; the first ring is the exterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    /// GeoJSON-style type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// All coordinates of the geometry, in storage order
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Geometry::Point(c) => vec![*c],
            Geometry::MultiPoint(cs) | Geometry::LineString(cs) => cs.clone(),
            Geometry::MultiLineString(parts) | Geometry::Polygon(parts) => {
                parts.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().collect()
            }
        }
    }
}

/// Attribute value of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Real(r) => write!(f, "{r}"),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

/// A single feature: optional geometry plus attributes in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, attributes: Vec<(String, AttributeValue)>) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Looks up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Features of one vector layer together with its CRS
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorDataset {
    pub crs: Option<CrsId>,
    pub features: Vec<Feature>,
}

impl VectorDataset {
    pub fn new(crs: Option<CrsId>, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_coords_flatten() {
        let polygon = Geometry::MultiPolygon(vec![vec![
            vec![
                Coord::new(0.0, 0.0),
                Coord::new(1.0, 0.0),
                Coord::new(0.0, 1.0),
                Coord::new(0.0, 0.0),
            ],
            vec![Coord::new(0.2, 0.2), Coord::new(0.3, 0.2), Coord::new(0.2, 0.2)],
        ]]);
        assert_eq!(polygon.coords().len(), 7);
        assert_eq!(polygon.type_name(), "MultiPolygon");
    }

    #[test]
    fn test_feature_attribute_lookup() {
        let feature = Feature::new(
            Some(Geometry::Point(Coord::new(1.0, 2.0))),
            vec![
                ("name".to_string(), AttributeValue::Text("Main St".to_string())),
                ("lanes".to_string(), AttributeValue::Integer(2)),
            ],
        );
        assert_eq!(feature.attribute("lanes"), Some(&AttributeValue::Integer(2)));
        assert_eq!(feature.attribute("missing"), None);
    }

    #[test]
    fn test_attribute_value_display() {
        assert_eq!(AttributeValue::Null.to_string(), "");
        assert_eq!(AttributeValue::Boolean(true).to_string(), "true");
        assert_eq!(AttributeValue::Real(1.5).to_string(), "1.5");
    }
}
