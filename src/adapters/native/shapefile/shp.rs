//! `.shp` / `.shx` geometry encoding
//!
//! Integers in the file and record headers are big-endian, everything inside
//! a record is little-endian. Lengths and offsets are counted in 16-bit words.

use super::ShapefileError;
use crate::domain::{Coord, Geometry};

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
pub(crate) const HEADER_LEN: usize = 100;
const RECORD_HEADER_LEN: usize = 8;

/// Shape types written by this codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
}

impl ShapeType {
    pub fn code(self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, ShapefileError> {
        match code {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            other => Err(ShapefileError::UnsupportedShapeType(other)),
        }
    }

    /// Picks the file shape type for a layer's geometries
    ///
    /// Points are promoted to MultiPoint when any multipoint is present.
    /// Layers without any geometry are Null-typed.
    pub fn for_geometries<'a>(
        geometries: impl IntoIterator<Item = Option<&'a Geometry>>,
    ) -> Result<Self, ShapefileError> {
        let mut chosen: Option<(ShapeType, &'static str)> = None;

        for geometry in geometries.into_iter().flatten() {
            let candidate = match geometry {
                Geometry::Point(_) => ShapeType::Point,
                Geometry::MultiPoint(_) => ShapeType::MultiPoint,
                Geometry::LineString(_) | Geometry::MultiLineString(_) => ShapeType::PolyLine,
                Geometry::Polygon(_) | Geometry::MultiPolygon(_) => ShapeType::Polygon,
            };

            chosen = match chosen {
                None => Some((candidate, geometry.type_name())),
                Some((current, first)) => {
                    if current == candidate {
                        Some((current, first))
                    } else if current.is_point_family() && candidate.is_point_family() {
                        Some((ShapeType::MultiPoint, first))
                    } else {
                        return Err(ShapefileError::MixedGeometry {
                            expected: first.to_string(),
                            found: geometry.type_name().to_string(),
                        });
                    }
                }
            };
        }

        Ok(chosen.map(|(shape_type, _)| shape_type).unwrap_or(ShapeType::Null))
    }

    fn is_point_family(self) -> bool {
        matches!(self, ShapeType::Point | ShapeType::MultiPoint)
    }
}

/// Bounding box of a record or file
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    fn of(coords: &[Coord]) -> Option<Self> {
        let first = coords.first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for c in &coords[1..] {
            bbox.expand(c);
        }
        Some(bbox)
    }

    fn expand(&mut self, c: &Coord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    fn merge(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    fn write_le(&self, out: &mut Vec<u8>) {
        for v in [self.min_x, self.min_y, self.max_x, self.max_y] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
}

/// Encoded `.shp` and `.shx` file contents
pub struct EncodedShapes {
    pub shp: Vec<u8>,
    pub shx: Vec<u8>,
}

/// Encodes one record per geometry into `.shp` and `.shx` buffers
pub fn encode(
    shape_type: ShapeType,
    geometries: &[Option<&Geometry>],
) -> Result<EncodedShapes, ShapefileError> {
    let mut records = Vec::with_capacity(geometries.len());
    let mut file_bbox: Option<BoundingBox> = None;

    for geometry in geometries {
        let (content, bbox) = encode_record(shape_type, *geometry)?;
        if let Some(bbox) = bbox {
            match file_bbox.as_mut() {
                Some(file_bbox) => file_bbox.merge(&bbox),
                None => file_bbox = Some(bbox),
            }
        }
        records.push(content);
    }

    let shp_len: usize = HEADER_LEN
        + records
            .iter()
            .map(|content| RECORD_HEADER_LEN + content.len())
            .sum::<usize>();
    let shx_len = HEADER_LEN + records.len() * RECORD_HEADER_LEN;

    let mut shp = Vec::with_capacity(shp_len);
    let mut shx = Vec::with_capacity(shx_len);
    write_header(&mut shp, shape_type, shp_len, file_bbox.as_ref())?;
    write_header(&mut shx, shape_type, shx_len, file_bbox.as_ref())?;

    for (index, content) in records.iter().enumerate() {
        let offset = to_words(shp.len())?;
        let content_words = to_words(content.len())?;
        let number = i32::try_from(index + 1).map_err(|_| ShapefileError::FileTooLarge)?;

        shp.extend_from_slice(&number.to_be_bytes());
        shp.extend_from_slice(&content_words.to_be_bytes());
        shp.extend_from_slice(content);

        shx.extend_from_slice(&offset.to_be_bytes());
        shx.extend_from_slice(&content_words.to_be_bytes());
    }

    Ok(EncodedShapes { shp, shx })
}

fn to_words(bytes: usize) -> Result<i32, ShapefileError> {
    i32::try_from(bytes / 2).map_err(|_| ShapefileError::FileTooLarge)
}

fn write_header(
    out: &mut Vec<u8>,
    shape_type: ShapeType,
    total_len: usize,
    bbox: Option<&BoundingBox>,
) -> Result<(), ShapefileError> {
    out.extend_from_slice(&FILE_CODE.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&to_words(total_len)?.to_be_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&shape_type.code().to_le_bytes());
    match bbox {
        Some(bbox) => bbox.write_le(out),
        None => out.extend_from_slice(&[0u8; 32]),
    }
    // Z and M ranges are unused for 2D shapes
    out.extend_from_slice(&[0u8; 32]);
    Ok(())
}

fn encode_record(
    shape_type: ShapeType,
    geometry: Option<&Geometry>,
) -> Result<(Vec<u8>, Option<BoundingBox>), ShapefileError> {
    let Some(geometry) = geometry.filter(|g| !g.coords().is_empty()) else {
        return Ok((ShapeType::Null.code().to_le_bytes().to_vec(), None));
    };

    let mut content = Vec::new();
    content.extend_from_slice(&shape_type.code().to_le_bytes());

    let bbox = match (shape_type, geometry) {
        (ShapeType::Point, Geometry::Point(c)) => {
            write_coord(&mut content, c);
            BoundingBox::of(std::slice::from_ref(c))
        }
        (ShapeType::MultiPoint, Geometry::Point(_) | Geometry::MultiPoint(_)) => {
            let points = geometry.coords();
            let bbox = BoundingBox::of(&points);
            write_bbox(&mut content, bbox.as_ref());
            content.extend_from_slice(&count(points.len())?.to_le_bytes());
            for c in &points {
                write_coord(&mut content, c);
            }
            bbox
        }
        (ShapeType::PolyLine, Geometry::LineString(line)) => {
            write_parts(&mut content, &[line.clone()])?
        }
        (ShapeType::PolyLine, Geometry::MultiLineString(lines)) => {
            let lines: Vec<Vec<Coord>> =
                lines.iter().filter(|line| !line.is_empty()).cloned().collect();
            write_parts(&mut content, &lines)?
        }
        (ShapeType::Polygon, Geometry::Polygon(rings)) => {
            write_parts(&mut content, &orient_polygon(rings)?)?
        }
        (ShapeType::Polygon, Geometry::MultiPolygon(polygons)) => {
            let mut rings = Vec::new();
            for polygon in polygons.iter().filter(|p| !p.is_empty()) {
                rings.extend(orient_polygon(polygon)?);
            }
            write_parts(&mut content, &rings)?
        }
        (_, other) => {
            return Err(ShapefileError::MixedGeometry {
                expected: format!("{shape_type:?}"),
                found: other.type_name().to_string(),
            })
        }
    };

    if shape_type == ShapeType::PolyLine {
        validate_lines(geometry)?;
    }

    Ok((content, bbox))
}

fn validate_lines(geometry: &Geometry) -> Result<(), ShapefileError> {
    let too_short = match geometry {
        Geometry::LineString(line) => line.len() < 2,
        Geometry::MultiLineString(lines) => lines.iter().any(|l| !l.is_empty() && l.len() < 2),
        _ => false,
    };
    if too_short {
        return Err(ShapefileError::InvalidGeometry(
            "line with fewer than two points".to_string(),
        ));
    }
    Ok(())
}

fn count(n: usize) -> Result<i32, ShapefileError> {
    i32::try_from(n).map_err(|_| ShapefileError::FileTooLarge)
}

fn write_coord(out: &mut Vec<u8>, c: &Coord) {
    out.extend_from_slice(&c.x.to_le_bytes());
    out.extend_from_slice(&c.y.to_le_bytes());
}

fn write_bbox(out: &mut Vec<u8>, bbox: Option<&BoundingBox>) {
    match bbox {
        Some(bbox) => bbox.write_le(out),
        None => out.extend_from_slice(&[0u8; 32]),
    }
}

fn write_parts(
    out: &mut Vec<u8>,
    parts: &[Vec<Coord>],
) -> Result<Option<BoundingBox>, ShapefileError> {
    let points: Vec<Coord> = parts.iter().flatten().copied().collect();
    let bbox = BoundingBox::of(&points);
    write_bbox(out, bbox.as_ref());
    out.extend_from_slice(&count(parts.len())?.to_le_bytes());
    out.extend_from_slice(&count(points.len())?.to_le_bytes());

    let mut start = 0usize;
    for part in parts {
        out.extend_from_slice(&count(start)?.to_le_bytes());
        start += part.len();
    }
    for c in &points {
        write_coord(out, c);
    }
    Ok(bbox)
}

/// Twice the signed area of a ring; positive for counter-clockwise rings
fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum()
}

fn close_ring(ring: &[Coord]) -> Result<Vec<Coord>, ShapefileError> {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (closed.first().copied(), closed.last().copied()) {
        if first != last {
            closed.push(first);
        }
    }
    if closed.len() < 4 {
        return Err(ShapefileError::InvalidGeometry(format!(
            "polygon ring with {} points",
            ring.len()
        )));
    }
    Ok(closed)
}

/// Closes every ring; exterior clockwise, holes counter-clockwise
fn orient_polygon(rings: &[Vec<Coord>]) -> Result<Vec<Vec<Coord>>, ShapefileError> {
    let mut oriented = Vec::with_capacity(rings.len());
    for (index, ring) in rings.iter().filter(|r| !r.is_empty()).enumerate() {
        let mut ring = close_ring(ring)?;
        let clockwise = signed_area(&ring) < 0.0;
        let want_clockwise = index == 0;
        if clockwise != want_clockwise {
            ring.reverse();
        }
        oriented.push(ring);
    }
    Ok(oriented)
}

/// Decodes a `.shp` file into one optional geometry per record
pub fn decode(bytes: &[u8]) -> Result<(ShapeType, Vec<Option<Geometry>>), ShapefileError> {
    if bytes.len() < HEADER_LEN {
        return Err(ShapefileError::Malformed("file shorter than header".to_string()));
    }
    let mut reader = ByteReader::new(bytes);
    if reader.i32_be()? != FILE_CODE {
        return Err(ShapefileError::Malformed("bad file code".to_string()));
    }
    reader.skip(20)?;
    let declared_len = usize::try_from(reader.i32_be()?)
        .map_err(|_| ShapefileError::Malformed("negative file length".to_string()))?
        * 2;
    let _version = reader.i32_le()?;
    let shape_type = ShapeType::from_code(reader.i32_le()?)?;
    reader.skip(64)?;

    let end = declared_len.min(bytes.len());
    let mut geometries = Vec::new();
    while reader.position() + RECORD_HEADER_LEN <= end {
        let _number = reader.i32_be()?;
        let content_len = usize::try_from(reader.i32_be()?)
            .map_err(|_| ShapefileError::Malformed("negative record length".to_string()))?
            * 2;
        let content = reader.take(content_len)?;
        geometries.push(decode_record(content)?);
    }

    Ok((shape_type, geometries))
}

fn decode_record(content: &[u8]) -> Result<Option<Geometry>, ShapefileError> {
    let mut reader = ByteReader::new(content);
    let shape_type = ShapeType::from_code(reader.i32_le()?)?;

    match shape_type {
        ShapeType::Null => Ok(None),
        ShapeType::Point => Ok(Some(Geometry::Point(reader.coord()?))),
        ShapeType::MultiPoint => {
            reader.skip(32)?;
            let n = reader.len_le()?;
            let points = (0..n).map(|_| reader.coord()).collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Geometry::MultiPoint(points)))
        }
        ShapeType::PolyLine | ShapeType::Polygon => {
            reader.skip(32)?;
            let num_parts = reader.len_le()?;
            let num_points = reader.len_le()?;
            let starts = (0..num_parts)
                .map(|_| reader.len_le())
                .collect::<Result<Vec<_>, _>>()?;
            let points = (0..num_points)
                .map(|_| reader.coord())
                .collect::<Result<Vec<_>, _>>()?;

            let mut parts = Vec::with_capacity(num_parts);
            for (i, &start) in starts.iter().enumerate() {
                let stop = starts.get(i + 1).copied().unwrap_or(num_points);
                let part = points.get(start..stop).ok_or_else(|| {
                    ShapefileError::Malformed("part index out of range".to_string())
                })?;
                parts.push(part.to_vec());
            }

            if shape_type == ShapeType::PolyLine {
                Ok(Some(match parts.len() {
                    1 => Geometry::LineString(parts.remove(0)),
                    _ => Geometry::MultiLineString(parts),
                }))
            } else {
                Ok(Some(assemble_polygons(parts)))
            }
        }
    }
}

/// Groups rings into polygons: a clockwise ring starts a new polygon
fn assemble_polygons(rings: Vec<Vec<Coord>>) -> Geometry {
    let mut polygons: Vec<Vec<Vec<Coord>>> = Vec::new();
    for ring in rings {
        let is_exterior = signed_area(&ring) < 0.0;
        match polygons.last_mut() {
            Some(polygon) if !is_exterior => polygon.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }

    if polygons.len() == 1 {
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(polygons)
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ShapefileError> {
        let slice = self
            .bytes
            .get(self.pos..self.pos + n)
            .ok_or_else(|| ShapefileError::Malformed("unexpected end of data".to_string()))?;
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), ShapefileError> {
        self.take(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ShapefileError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn i32_be(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn i32_le(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn len_le(&mut self) -> Result<usize, ShapefileError> {
        usize::try_from(self.i32_le()?)
            .map_err(|_| ShapefileError::Malformed("negative count".to_string()))
    }

    fn f64_le(&mut self) -> Result<f64, ShapefileError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn coord(&mut self) -> Result<Coord, ShapefileError> {
        Ok(Coord::new(self.f64_le()?, self.f64_le()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Coord> {
        vec![
            Coord::new(x0, y0),
            Coord::new(x0 + size, y0),
            Coord::new(x0 + size, y0 + size),
            Coord::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_shape_type_selection() {
        let point = Geometry::Point(Coord::new(1.0, 2.0));
        let multi = Geometry::MultiPoint(vec![Coord::new(1.0, 2.0)]);
        let line = Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]);

        assert_eq!(
            ShapeType::for_geometries([Some(&point), None]).unwrap(),
            ShapeType::Point
        );
        assert_eq!(
            ShapeType::for_geometries([Some(&point), Some(&multi)]).unwrap(),
            ShapeType::MultiPoint
        );
        assert_eq!(ShapeType::for_geometries([None, None]).unwrap(), ShapeType::Null);

        let err = ShapeType::for_geometries([Some(&point), Some(&line)]).unwrap_err();
        assert!(matches!(err, ShapefileError::MixedGeometry { .. }));
    }

    #[test]
    fn test_header_layout() {
        let point = Geometry::Point(Coord::new(174.76, -36.85));
        let encoded = encode(ShapeType::Point, &[Some(&point)]).unwrap();

        // 100 byte header + 8 byte record header + 20 byte point
        assert_eq!(encoded.shp.len(), 128);
        assert_eq!(&encoded.shp[0..4], &9994i32.to_be_bytes());
        assert_eq!(&encoded.shp[24..28], &64i32.to_be_bytes());
        assert_eq!(&encoded.shp[28..32], &1000i32.to_le_bytes());
        assert_eq!(&encoded.shp[32..36], &1i32.to_le_bytes());

        assert_eq!(encoded.shx.len(), 108);
        assert_eq!(&encoded.shx[100..104], &50i32.to_be_bytes());
        assert_eq!(&encoded.shx[104..108], &10i32.to_be_bytes());
    }

    #[test]
    fn test_polygon_rings_closed_and_oriented() {
        // Counter-clockwise exterior and clockwise hole, both unclosed
        let mut hole = square(2.0, 2.0, 1.0);
        hole.reverse();
        let polygon = Geometry::Polygon(vec![square(0.0, 0.0, 10.0), hole]);

        let encoded = encode(ShapeType::Polygon, &[Some(&polygon)]).unwrap();
        let (_, decoded) = decode(&encoded.shp).unwrap();

        let Some(Geometry::Polygon(rings)) = &decoded[0] else {
            panic!("expected polygon, got {:?}", decoded[0]);
        };
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
        assert!(signed_area(&rings[0]) < 0.0);
        assert!(signed_area(&rings[1]) > 0.0);
    }

    #[test]
    fn test_multipolygon_decodes_as_two_polygons() {
        let geometry = Geometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0)],
            vec![square(5.0, 5.0, 1.0)],
        ]);
        let encoded = encode(ShapeType::Polygon, &[Some(&geometry)]).unwrap();
        let (_, decoded) = decode(&encoded.shp).unwrap();
        assert!(matches!(&decoded[0], Some(Geometry::MultiPolygon(p)) if p.len() == 2));
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let polygon = Geometry::Polygon(vec![vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]]);
        let err = encode(ShapeType::Polygon, &[Some(&polygon)]).err().unwrap();
        assert!(matches!(err, ShapefileError::InvalidGeometry(_)));
    }

    #[test]
    fn test_null_records_round_trip() {
        let line = Geometry::MultiLineString(vec![
            vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0)],
            vec![Coord::new(2.0, 0.0), Coord::new(3.0, 1.0)],
        ]);
        let encoded = encode(ShapeType::PolyLine, &[None, Some(&line)]).unwrap();
        let (shape_type, decoded) = decode(&encoded.shp).unwrap();

        assert_eq!(shape_type, ShapeType::PolyLine);
        assert_eq!(decoded, vec![None, Some(line)]);
    }

    #[test]
    fn test_point_promoted_in_multipoint_layer() {
        let point = Geometry::Point(Coord::new(3.0, 4.0));
        let encoded = encode(ShapeType::MultiPoint, &[Some(&point)]).unwrap();
        let (_, decoded) = decode(&encoded.shp).unwrap();
        assert_eq!(
            decoded,
            vec![Some(Geometry::MultiPoint(vec![Coord::new(3.0, 4.0)]))]
        );
    }

    #[test]
    fn test_truncated_file_is_malformed() {
        let point = Geometry::Point(Coord::new(1.0, 1.0));
        let encoded = encode(ShapeType::Point, &[Some(&point)]).unwrap();
        assert!(decode(&encoded.shp[..50]).is_err());
    }
}
