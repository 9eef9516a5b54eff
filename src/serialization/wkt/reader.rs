use crate::core::{GeomResult, GeometryError};
use crate::crs::{CoordinateReferenceSystem, CrsId};
use crate::geometry::{Geometry, GeometryType, Shape};
use crate::positions::{DimensionalFlag, Position, PositionSequence};
use crate::serialization::ParserResult;
use regex::Regex;
use std::sync::{Arc, OnceLock};

const ORDINATE: &str = r"^\s*(-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";
const GEOM_TYPE: &str = r"^\s*([A-Z]+)\s*";
const DIMENSION: &str = r"^(ZM|Z|M)\b\s*";
const SRID: &str = r"^\s*SRID\s*=\s*(-?\d+)\s*;";

/// Deepest collection nesting accepted by the reader
const MAX_NESTING: usize = 64;

static ORDINATE_RE: OnceLock<Regex> = OnceLock::new();
static GEOM_TYPE_RE: OnceLock<Regex> = OnceLock::new();
static DIMENSION_RE: OnceLock<Regex> = OnceLock::new();
static SRID_RE: OnceLock<Regex> = OnceLock::new();

// Get ordinate regex once to avoid recompilation (thread-safe)
fn ordinate_re() -> &'static Regex {
    ORDINATE_RE.get_or_init(|| Regex::new(ORDINATE).unwrap())
}

fn geom_type_re() -> &'static Regex {
    GEOM_TYPE_RE.get_or_init(|| Regex::new(GEOM_TYPE).unwrap())
}

fn dimension_re() -> &'static Regex {
    DIMENSION_RE.get_or_init(|| Regex::new(DIMENSION).unwrap())
}

fn srid_re() -> &'static Regex {
    SRID_RE.get_or_init(|| Regex::new(SRID).unwrap())
}

/// Parse a WKT (or EWKT) string into a geometry
///
/// An `SRID=<code>;` prefix selects the EPSG reference system; without it the geometry
/// gets the undefined reference system. Tags must be upper case and the number of
/// ordinates per position must match the declared `Z`/`M`/`ZM` dimension.
///
/// Examples
/// ```rust
/// use geoser::serialization::parse_wkt;
/// use geoser::{DimensionalFlag, GeometryType};
///
/// let geom = parse_wkt("SRID=4326;LINESTRING Z (0 0 1, 1 1 2)").unwrap();
/// assert_eq!(geom.geometry_type(), GeometryType::LineString);
/// assert_eq!(geom.dimension(), DimensionalFlag::Xyz);
/// assert_eq!(geom.crs().to_string(), "EPSG:4326");
///
/// assert!(parse_wkt("Point (0 0)").is_err());
/// ```
pub fn parse_wkt(raw_str: &str) -> GeomResult<Geometry> {
    let (crs, rest) = parse_srid(raw_str)?;
    let (geom, trailing) = parse_geometry(rest, &crs, 0)?;
    if !trailing.trim().is_empty() {
        Err(GeometryError::Parsing(String::from(
            "Trailing characters after geometry!",
        )))
    } else {
        Ok(geom)
    }
}

// Strip an optional EWKT SRID prefix and build the reference system
fn parse_srid(raw_str: &str) -> ParserResult<'_, Arc<CoordinateReferenceSystem>> {
    match srid_re().captures(raw_str) {
        None => Ok((
            Arc::new(CoordinateReferenceSystem::undefined()),
            raw_str,
        )),
        Some(cap) => {
            let code = cap[1]
                .parse::<i32>()
                .map_err(|e| GeometryError::Parsing(format!("Invalid SRID '{}': {e}", &cap[1])))?;
            let crs = CoordinateReferenceSystem::from_id(CrsId::epsg(code));
            Ok((Arc::new(crs), &raw_str[cap.get_match().end()..]))
        }
    }
}

/// Identifies the type of geometry at the start of a WKT string
fn identify_type(raw_str: &str) -> ParserResult<'_, GeometryType> {
    let re = geom_type_re();
    if let Some(cap) = re.captures(raw_str) {
        let tag = &cap[1];
        let end = cap.get_match().end();
        match GeometryType::from_wkt_tag(tag) {
            Some(ty) => Ok((ty, &raw_str[end..])),
            None => Err(GeometryError::Parsing(format!(
                "Unsupported Geometry: {tag}"
            ))),
        }
    } else {
        Err(GeometryError::Parsing(String::from(
            "Could not parse shape type",
        )))
    }
}

// Optional Z / M / ZM marker following the tag
fn parse_dimension(raw_str: &str) -> (Option<DimensionalFlag>, &str) {
    match dimension_re().captures(raw_str) {
        None => (None, raw_str),
        Some(cap) => {
            let flag = match &cap[1] {
                "ZM" => DimensionalFlag::Xyzm,
                "Z" => DimensionalFlag::Xyz,
                _ => DimensionalFlag::Xym,
            };
            (Some(flag), &raw_str[cap.get_match().end()..])
        }
    }
}

fn strip_empty(raw_str: &str) -> Option<&str> {
    raw_str.trim_start().strip_prefix("EMPTY")
}

/// Parse one tagged geometry from the start of the string, `depth` levels inside
/// collections
fn parse_geometry<'a>(
    raw_str: &'a str,
    crs: &Arc<CoordinateReferenceSystem>,
    depth: usize,
) -> ParserResult<'a, Geometry> {
    if depth > MAX_NESTING {
        return Err(GeometryError::Parsing(format!(
            "Geometry collections nested deeper than {MAX_NESTING} levels"
        )));
    }
    let (ty, rest) = identify_type(raw_str)?;
    let (declared, rest) = parse_dimension(rest);
    let dim = declared.unwrap_or(DimensionalFlag::Xy);

    if let Some(tail) = strip_empty(rest) {
        return Ok((Geometry::empty(ty, dim, Arc::clone(crs)), tail));
    }

    let (shape, tail) = match ty {
        GeometryType::Point => {
            let (seq, tail) = parse_coordinate_list(rest, dim)?;
            if seq.len() != 1 {
                return Err(GeometryError::Parsing(format!(
                    "A point needs exactly one position, got {}",
                    seq.len()
                )));
            }
            (Shape::Point(seq), tail)
        }
        GeometryType::LineString => {
            let (seq, tail) = parse_coordinate_list(rest, dim)?;
            (Shape::LineString(seq), tail)
        }
        GeometryType::LinearRing => {
            let (seq, tail) = parse_coordinate_list(rest, dim)?;
            (Shape::LinearRing(seq), tail)
        }
        GeometryType::MultiPoint => {
            let (seq, tail) = parse_multipoint(rest, dim)?;
            (Shape::MultiPoint(seq), tail)
        }
        GeometryType::Polygon => {
            let (rings, tail) = parse_sequence_list(rest, dim)?;
            (Shape::Polygon(rings), tail)
        }
        GeometryType::MultiLineString => {
            let (lines, tail) = parse_sequence_list(rest, dim)?;
            (Shape::MultiLineString(lines), tail)
        }
        GeometryType::MultiPolygon => {
            let (polygons, tail) = parse_list(rest, |r| match strip_empty(r) {
                Some(tail) => Ok((Vec::new(), tail)),
                None => parse_sequence_list(r, dim),
            })?;
            (Shape::MultiPolygon(polygons), tail)
        }
        GeometryType::GeometryCollection => {
            let (members, tail) = parse_list(rest, |r| parse_geometry(r, crs, depth + 1))?;
            let shape = Shape::GeometryCollection(members);
            // Members carry their own markers; an unmarked collection takes theirs
            let geom = match declared {
                Some(dim) => Geometry::with_dimension(shape, dim, Arc::clone(crs))?,
                None => Geometry::new(shape, Arc::clone(crs))?,
            };
            return Ok((geom, tail));
        }
    };
    let geom = Geometry::with_dimension(shape, dim, Arc::clone(crs))?;
    Ok((geom, tail))
}

/// Parse a parenthesised, comma separated list of elements
fn parse_list<'a, T, F>(raw_str: &'a str, mut element: F) -> ParserResult<'a, Vec<T>>
where
    F: FnMut(&'a str) -> ParserResult<'a, T>,
{
    let mut trimmed = match raw_str.trim_start().strip_prefix("(") {
        None => {
            return Err(GeometryError::Parsing(String::from(
                "Expected '(' to start list of elements",
            )));
        }
        Some(s) => s,
    };
    let mut items = Vec::new();
    loop {
        let (item, rest) = element(trimmed)?;
        items.push(item);
        let rest = rest.trim_start();
        match rest.strip_prefix(",") {
            Some(s) => trimmed = s,
            None => {
                trimmed = rest;
                break;
            }
        }
    }
    match trimmed.strip_prefix(")") {
        None => Err(GeometryError::Parsing(String::from(
            "Expected ')' to close list of elements",
        ))),
        Some(s) => Ok((items, s)),
    }
}

// List of position sequences, each either parenthesised or EMPTY
fn parse_sequence_list(
    raw_str: &str,
    dim: DimensionalFlag,
) -> ParserResult<'_, Vec<PositionSequence>> {
    parse_list(raw_str, |r| match strip_empty(r) {
        Some(tail) => Ok((PositionSequence::empty(dim), tail)),
        None => parse_coordinate_list(r, dim),
    })
}

/// Parse a single position with as many ordinates as the dimension requires
fn parse_position(raw_str: &str, dim: DimensionalFlag) -> ParserResult<'_, Position> {
    let re = ordinate_re();
    let mut trimmed = raw_str;
    let mut ordinates = [0.0; 4];
    let total = dim.coordinate_dimension();

    for slot in ordinates.iter_mut().take(total) {
        let Some(cap) = re.captures(trimmed) else {
            return Err(GeometryError::Parsing(format!(
                "Expected {total} ordinates for a {dim} position"
            )));
        };
        *slot = cap[1]
            .parse::<f64>()
            .map_err(|e| GeometryError::Parsing(format!("Invalid ordinate '{}': {e}", &cap[1])))?;
        trimmed = &trimmed[cap.get_match().end()..];
    }
    let pos = Position::from_ordinates(dim, &ordinates[..total])?;
    Ok((pos, trimmed))
}

/// Parse a list of positions from the start of a string
fn parse_coordinate_list(
    raw_str: &str,
    dim: DimensionalFlag,
) -> ParserResult<'_, PositionSequence> {
    let (positions, rest) = parse_list(raw_str, |r| parse_position(r, dim))?;
    Ok((PositionSequence::new(dim, positions)?, rest))
}

/// Parse multipoint positions, written either flat `(1 2, 3 4)` or nested `((1 2), (3 4))`
fn parse_multipoint(raw_str: &str, dim: DimensionalFlag) -> ParserResult<'_, PositionSequence> {
    let nested = raw_str
        .trim_start()
        .strip_prefix("(")
        .is_some_and(|s| s.trim_start().starts_with('('));
    if !nested {
        return parse_coordinate_list(raw_str, dim);
    }

    let (points, rest) = parse_list(raw_str, |r| {
        let (seq, tail) = parse_coordinate_list(r, dim)?;
        match seq.get(0) {
            Some(pos) if seq.len() == 1 => Ok((*pos, tail)),
            _ => Err(GeometryError::Parsing(String::from(
                "Each multipoint member needs exactly one position",
            ))),
        }
    })?;
    Ok((PositionSequence::new(dim, points)?, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, rng};

    // Get a vector of random 2D positions with coordinates between -1 and 1
    fn get_random_positions(total: usize) -> Vec<Position> {
        let mut random = rng();
        let mut positions = Vec::with_capacity(total);

        for _ in 0..total {
            positions.push(Position::new(
                (random.random::<f64>() - 0.5) * 2.0,
                (random.random::<f64>() - 0.5) * 2.0,
            ));
        }
        positions
    }

    #[test]
    fn test_identify_type_valid() {
        match identify_type("POINT (0 0)") {
            Ok((GeometryType::Point, rest)) => assert_eq!(rest, "(0 0)"),
            other => panic!("Unexpected result: {other:?}"),
        }

        match identify_type("GEOMETRYCOLLECTION EMPTY") {
            Ok((GeometryType::GeometryCollection, _)) => (),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_identify_type_invalid() {
        let res = identify_type("PoinT(0 1)");
        if res.is_ok() {
            panic!("Expected parse error (capitalization)");
        }

        let res2 = identify_type("PO INT(0 1)");
        if res2.is_ok() {
            panic!("Expected parse error (spacing)");
        }

        let res3 = identify_type("! POLYGON ((0 0, 0 1, 1 1, 1 0, 0 0))");
        if res3.is_ok() {
            panic!("Expected parse error (invalid prefix)");
        }

        let res4 = identify_type("NOTASHAPE ((0 0, 0 1, 1 1, 1 0, 0 0))");
        if res4.is_ok() {
            panic!("Expected parse error (invalid type)");
        }
    }

    #[test]
    fn test_parse_dimension_marker() {
        assert_eq!(parse_dimension("ZM (1 2 3 4)").0, Some(DimensionalFlag::Xyzm));
        assert_eq!(parse_dimension("Z(1 2 3)").0, Some(DimensionalFlag::Xyz));
        assert_eq!(parse_dimension("M EMPTY").0, Some(DimensionalFlag::Xym));
        assert_eq!(parse_dimension("EMPTY").0, None);
        assert_eq!(parse_dimension("(1 2)").0, None);
    }

    #[test]
    fn test_parse_point_valid() {
        let total_examples = 250;
        let mut random = rng();
        for _ in 0..total_examples {
            let x = (random.random::<f64>() - 0.5) * 2.0;
            let y = (random.random::<f64>() - 0.5) * 2.0;
            let wkt_str = format!("POINT ({x} {y})");

            let geom = parse_wkt(&wkt_str).unwrap();
            match geom.shape() {
                Shape::Point(seq) => assert!(seq.get(0).unwrap().is_close(&Position::new(x, y))),
                _ => panic!("Expected a point!"),
            }
        }
    }

    #[test]
    fn test_parse_point_invalid() {
        for raw in [
            "POINT(0 1, 2 3)",
            "POINT (0)",
            "POINT(-0.9 1.75 9.0)",
            "POINT Z (1 2)",
            "POINT(0 1))",
            "POINT((0 1))",
            "-POINT(0 1)",
            "POINT ()",
        ] {
            if let Ok(geom) = parse_wkt(raw) {
                panic!("Parsed invalid point '{raw}' as {geom:?}");
            }
        }
    }

    #[test]
    fn test_parse_measured_point() {
        let geom = parse_wkt("POINT ZM (1 2 3 4)").unwrap();
        assert_eq!(geom.dimension(), DimensionalFlag::Xyzm);
        match geom.shape() {
            Shape::Point(seq) => {
                let pos = seq.get(0).unwrap();
                assert_eq!(pos.z(), Some(3.0));
                assert_eq!(pos.m(), Some(4.0));
            }
            _ => panic!("Expected a point!"),
        }

        let geom = parse_wkt("POINT M (1 2 -4.5e2)").unwrap();
        assert_eq!(geom.dimension(), DimensionalFlag::Xym);
    }

    #[test]
    fn test_parse_coord_list_random() {
        let positions = get_random_positions(300);
        let mut formatted = String::from("(");
        for p in &positions {
            formatted.push_str(&format!("{} {},", p.x(), p.y()));
        }
        let mut formatted = formatted.trim_end_matches(',').to_string();
        formatted.push(')');

        let (seq, rest) = parse_coordinate_list(&formatted, DimensionalFlag::Xy).unwrap();
        assert!(rest.is_empty());
        assert_eq!(seq.len(), positions.len());

        for (a, b) in positions.iter().zip(seq.iter()) {
            assert!(a.is_close(b))
        }
    }

    #[test]
    fn test_parse_coord_list_invalid() {
        for raw in [
            "(0, 0.0 1.98)",
            "(0 -1.0, 0.0 1.98, Q P)",
            "(0 -1.0, 0.0 1.98",
            "0 -1.0, 0.0 1.98)",
        ] {
            if let Ok(_) = parse_coordinate_list(raw, DimensionalFlag::Xy) {
                panic!("Parsed invalid coordinate list '{raw}'")
            }
        }
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let geom =
            parse_wkt("POLYGON ((0 0, 4 0, 4 4, 0 0), (1 1, 2 1, 2 2, 1 1))").unwrap();
        match geom.shape() {
            Shape::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0].len(), 4);
                assert!(rings[1].get(1).unwrap().is_close(&Position::new(2.0, 1.0)));
            }
            _ => panic!("Expected a polygon!"),
        }
    }

    #[test]
    fn test_parse_multipoint_both_forms() {
        let flat = parse_wkt("MULTIPOINT (0 0, 1 0, 0.5 0.5)").unwrap();
        let nested = parse_wkt("MULTIPOINT ((0 0), (1 0), (0.5 0.5))").unwrap();
        assert_eq!(flat, nested);
        assert_eq!(flat.num_positions(), 3);

        if let Ok(_) = parse_wkt("MULTIPOINT ((0 0, 1 0), (0.5 0.5))") {
            panic!("Parsed multipoint member with two positions");
        }
    }

    #[test]
    fn test_parse_multipolygon() {
        let geom = parse_wkt(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5), (5.2 5.1, 5.8 5.1, 5.8 5.7, 5.2 5.1)))",
        )
        .unwrap();
        match geom.shape() {
            Shape::MultiPolygon(polygons) => {
                assert_eq!(polygons.len(), 2);
                assert_eq!(polygons[1].len(), 2);
            }
            _ => panic!("Expected a multipolygon!"),
        }
    }

    #[test]
    fn test_parse_collection() {
        let geom =
            parse_wkt("SRID=31370;GEOMETRYCOLLECTION (POINT Z (1 2 3), LINESTRING Z EMPTY)")
                .unwrap();
        assert_eq!(geom.dimension(), DimensionalFlag::Xyz);
        assert_eq!(geom.crs().crs_id().code(), 31370);
        match geom.shape() {
            Shape::GeometryCollection(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].crs().crs_id().code(), 31370);
                assert!(members[1].is_empty());
            }
            _ => panic!("Expected a collection!"),
        }

        if let Ok(_) = parse_wkt("GEOMETRYCOLLECTION (POINT Z (1 2 3), POINT (1 2))") {
            panic!("Parsed a collection with mixed dimensions");
        }
    }

    #[test]
    fn test_parse_empty_and_srid() {
        let geom = parse_wkt("LINESTRING EMPTY").unwrap();
        assert!(geom.is_empty());
        assert!(geom.crs().crs_id().is_undefined());

        let geom = parse_wkt("SRID=4326; POLYGON Z EMPTY").unwrap();
        assert!(geom.is_empty());
        assert_eq!(geom.dimension(), DimensionalFlag::Xyz);
        assert_eq!(geom.crs().to_string(), "EPSG:4326");
    }

    fn nested_collection(levels: usize) -> String {
        let mut raw = String::new();
        for _ in 0..levels {
            raw.push_str("GEOMETRYCOLLECTION (");
        }
        raw.push_str("POINT (1 2)");
        for _ in 0..levels {
            raw.push(')');
        }
        raw
    }

    #[test]
    fn test_nesting_limit() {
        let geom = parse_wkt(&nested_collection(MAX_NESTING)).unwrap();
        assert_eq!(geom.num_positions(), 1);

        for levels in [MAX_NESTING + 1, 20_000] {
            match parse_wkt(&nested_collection(levels)) {
                Err(GeometryError::Parsing(msg)) => assert!(msg.contains("nested")),
                Err(other) => panic!("Unexpected error: {other:?}"),
                Ok(_) => panic!("Parsed {levels} nested collections"),
            }
        }
    }

    #[test]
    fn test_parse_empty_members() {
        let geom = parse_wkt("GEOMETRYCOLLECTION (POINT EMPTY, LINESTRING EMPTY)").unwrap();
        assert!(geom.is_empty());
        match geom.shape() {
            Shape::GeometryCollection(members) => assert_eq!(members.len(), 2),
            _ => panic!("Expected a collection!"),
        }

        let geom = parse_wkt("MULTIPOLYGON (EMPTY, ((0 0, 1 0, 1 1, 0 0)))").unwrap();
        match geom.shape() {
            Shape::MultiPolygon(polygons) => {
                assert!(polygons[0].is_empty());
                assert_eq!(polygons[1].len(), 1);
            }
            _ => panic!("Expected a multipolygon!"),
        }
    }

    #[test]
    fn test_trailing_characters() {
        if let Ok(_) = parse_wkt("POINT (1 2) POINT (3 4)") {
            panic!("Parsed trailing geometry");
        }
        if let Ok(_) = parse_wkt("LINESTRING EMPTY)") {
            panic!("Parsed trailing parenthesis");
        }
    }
}
