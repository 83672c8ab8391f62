//! GeoJSON source reader
//!
//! Reads a `FeatureCollection` (or a single `Feature`) into the feature
//! model. Positions keep their first two ordinates; Z and M are dropped.
//! Nested property values (arrays, objects) are kept as their JSON text.

use crate::domain::{AttributeValue, Coord, Feature, Geometry};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors reading a GeoJSON source
#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid GeoJSON: {0}")]
    Invalid(String),
}

fn invalid(message: impl Into<String>) -> GeoJsonError {
    GeoJsonError::Invalid(message.into())
}

/// Reads the features of a GeoJSON file
pub fn read_features(path: &Path) -> Result<Vec<Feature>, GeoJsonError> {
    let text = std::fs::read_to_string(path).map_err(|source| GeoJsonError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_features(&text)
}

/// Parses GeoJSON text into features
pub fn parse_features(text: &str) -> Result<Vec<Feature>, GeoJsonError> {
    let document: Value = serde_json::from_str(text)?;

    match document.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => document
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("FeatureCollection without a features array"))?
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                parse_feature(feature)
                    .map_err(|e| invalid(format!("feature {index}: {e}")))
            })
            .collect(),
        Some("Feature") => Ok(vec![parse_feature(&document)?]),
        Some(other) => Err(invalid(format!("unsupported document type '{other}'"))),
        None => Err(invalid("document has no type")),
    }
}

fn parse_feature(value: &Value) -> Result<Feature, GeoJsonError> {
    if value.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(invalid("expected a Feature"));
    }

    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(geometry) => Some(parse_geometry(geometry)?),
    };

    let attributes = match value.get("properties") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(properties)) => properties
            .iter()
            .map(|(key, value)| (key.clone(), attribute_value(value)))
            .collect(),
        Some(_) => return Err(invalid("properties must be an object")),
    };

    Ok(Feature::new(geometry, attributes))
}

fn attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Integer(i),
            None => n
                .as_f64()
                .map(AttributeValue::Real)
                .unwrap_or(AttributeValue::Null),
        },
        Value::String(s) => AttributeValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => AttributeValue::Text(value.to_string()),
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry, GeoJsonError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("geometry has no type"))?;
    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| invalid(format!("{kind} has no coordinates")))?;

    match kind {
        "Point" => Ok(Geometry::Point(position(coordinates)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(positions(coordinates)?)),
        "LineString" => Ok(Geometry::LineString(positions(coordinates)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(nested(coordinates, positions)?)),
        "Polygon" => Ok(Geometry::Polygon(nested(coordinates, positions)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(nested(coordinates, |rings| {
            nested(rings, positions)
        })?)),
        other => Err(invalid(format!("unsupported geometry type '{other}'"))),
    }
}

fn position(value: &Value) -> Result<Coord, GeoJsonError> {
    let ordinates = value
        .as_array()
        .filter(|ordinates| ordinates.len() >= 2)
        .ok_or_else(|| invalid("position needs at least two numbers"))?;
    let x = ordinates[0]
        .as_f64()
        .ok_or_else(|| invalid("position ordinate is not a number"))?;
    let y = ordinates[1]
        .as_f64()
        .ok_or_else(|| invalid("position ordinate is not a number"))?;
    Ok(Coord::new(x, y))
}

fn positions(value: &Value) -> Result<Vec<Coord>, GeoJsonError> {
    nested(value, position)
}

fn nested<T>(
    value: &Value,
    item: impl Fn(&Value) -> Result<T, GeoJsonError>,
) -> Result<Vec<T>, GeoJsonError> {
    value
        .as_array()
        .ok_or_else(|| invalid("coordinates must be an array"))?
        .iter()
        .map(item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection() {
        let features = parse_features(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": {"type": "LineString", "coordinates": [[174.7, -36.8, 12.0], [174.8, -36.9]]},
                        "properties": {"name": "Great North Rd", "lanes": 4, "width": 12.5, "tags": ["a", "b"]}
                    },
                    {"type": "Feature", "geometry": null, "properties": null}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0].geometry,
            Some(Geometry::LineString(vec![
                Coord::new(174.7, -36.8),
                Coord::new(174.8, -36.9)
            ]))
        );
        let keys: Vec<_> = features[0].attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "lanes", "width", "tags"]);
        assert_eq!(features[0].attribute("lanes"), Some(&AttributeValue::Integer(4)));
        assert_eq!(features[0].attribute("width"), Some(&AttributeValue::Real(12.5)));
        assert_eq!(
            features[0].attribute("tags"),
            Some(&AttributeValue::Text("[\"a\",\"b\"]".to_string()))
        );
        assert!(features[1].geometry.is_none());
        assert!(features[1].attributes.is_empty());
    }

    #[test]
    fn test_multipolygon() {
        let features = parse_features(
            r#"{"type": "Feature", "properties": {},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]]]}}"#,
        )
        .unwrap();
        assert!(matches!(
            &features[0].geometry,
            Some(Geometry::MultiPolygon(polygons)) if polygons[0][0].len() == 4
        ));
    }

    #[test]
    fn test_rejects_geometry_collection() {
        let err = parse_features(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "GeometryCollection", "geometries": []}}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("feature 0"));
    }

    #[test]
    fn test_rejects_non_geojson() {
        assert!(matches!(
            parse_features("{\"layers\": []}"),
            Err(GeoJsonError::Invalid(_))
        ));
        assert!(matches!(parse_features("not json"), Err(GeoJsonError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = read_features(Path::new("/nonexistent/roads.geojson")).unwrap_err();
        assert!(matches!(err, GeoJsonError::Io { .. }));
    }
}
