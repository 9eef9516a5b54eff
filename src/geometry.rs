use super::core::{GeomResult, GeometryError};
use super::crs::CoordinateReferenceSystem;
use super::positions::{DimensionalFlag, Position, PositionSequence};
use super::serialization::wkt;
use std::fmt;
use std::sync::Arc;

/// The geometry variants known to both serializers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

/// Names of a geometry type in the WKT and GeoJSON vocabularies
#[derive(Debug)]
pub struct TypeDescriptor {
    pub geometry_type: GeometryType,
    pub wkt_tag: &'static str,
    pub camel_case: &'static str,
}

const DESCRIPTORS: [TypeDescriptor; 8] = [
    TypeDescriptor {
        geometry_type: GeometryType::Point,
        wkt_tag: "POINT",
        camel_case: "Point",
    },
    TypeDescriptor {
        geometry_type: GeometryType::LineString,
        wkt_tag: "LINESTRING",
        camel_case: "LineString",
    },
    TypeDescriptor {
        geometry_type: GeometryType::LinearRing,
        wkt_tag: "LINEARRING",
        camel_case: "LinearRing",
    },
    TypeDescriptor {
        geometry_type: GeometryType::Polygon,
        wkt_tag: "POLYGON",
        camel_case: "Polygon",
    },
    TypeDescriptor {
        geometry_type: GeometryType::MultiPoint,
        wkt_tag: "MULTIPOINT",
        camel_case: "MultiPoint",
    },
    TypeDescriptor {
        geometry_type: GeometryType::MultiLineString,
        wkt_tag: "MULTILINESTRING",
        camel_case: "MultiLineString",
    },
    TypeDescriptor {
        geometry_type: GeometryType::MultiPolygon,
        wkt_tag: "MULTIPOLYGON",
        camel_case: "MultiPolygon",
    },
    TypeDescriptor {
        geometry_type: GeometryType::GeometryCollection,
        wkt_tag: "GEOMETRYCOLLECTION",
        camel_case: "GeometryCollection",
    },
];

impl GeometryType {
    pub const ALL: [GeometryType; 8] = [
        Self::Point,
        Self::LineString,
        Self::LinearRing,
        Self::Polygon,
        Self::MultiPoint,
        Self::MultiLineString,
        Self::MultiPolygon,
        Self::GeometryCollection,
    ];

    /// Entry of the descriptor table for this type
    pub fn descriptor(self) -> &'static TypeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Upper-case WKT tag, e.g. `LINESTRING`
    pub fn wkt_tag(self) -> &'static str {
        self.descriptor().wkt_tag
    }

    /// GeoJSON name, e.g. `LineString`
    pub fn camel_case(self) -> &'static str {
        self.descriptor().camel_case
    }

    /// Look up a type by its WKT tag (case sensitive)
    pub fn from_wkt_tag(tag: &str) -> Option<Self> {
        DESCRIPTORS
            .iter()
            .find(|d| d.wkt_tag == tag)
            .map(|d| d.geometry_type)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.wkt_tag())
    }
}

/// Coordinate content of a geometry, one variant per geometry type
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Holds zero (empty point) or one position
    Point(PositionSequence),
    LineString(PositionSequence),
    LinearRing(PositionSequence),
    /// Exterior ring first, then the interior rings
    Polygon(Vec<PositionSequence>),
    MultiPoint(PositionSequence),
    MultiLineString(Vec<PositionSequence>),
    MultiPolygon(Vec<Vec<PositionSequence>>),
    GeometryCollection(Vec<Geometry>),
}

impl Shape {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Shape::Point(_) => GeometryType::Point,
            Shape::LineString(_) => GeometryType::LineString,
            Shape::LinearRing(_) => GeometryType::LinearRing,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::MultiPoint(_) => GeometryType::MultiPoint,
            Shape::MultiLineString(_) => GeometryType::MultiLineString,
            Shape::MultiPolygon(_) => GeometryType::MultiPolygon,
            Shape::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    // Position sequences directly held by this shape (none for collections)
    fn sequences(&self) -> Vec<&PositionSequence> {
        match self {
            Shape::Point(seq)
            | Shape::LineString(seq)
            | Shape::LinearRing(seq)
            | Shape::MultiPoint(seq) => vec![seq],
            Shape::Polygon(rings) | Shape::MultiLineString(rings) => rings.iter().collect(),
            Shape::MultiPolygon(polygons) => polygons.iter().flatten().collect(),
            Shape::GeometryCollection(_) => Vec::new(),
        }
    }
}

/// A geometry: its shape plus a shared reference to its coordinate reference system
///
/// Examples
/// ```rust
/// use std::sync::Arc;
/// use geoser::{CoordinateReferenceSystem, Geometry, GeometryType, Position};
///
/// let wgs84 = Arc::new(CoordinateReferenceSystem::wgs84());
/// let pt = Geometry::point(Position::new(10.0, 20.0), wgs84);
/// assert_eq!(pt.geometry_type(), GeometryType::Point);
/// assert_eq!(pt.to_string(), "POINT (10 20)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    shape: Shape,
    dimension: DimensionalFlag,
    crs: Arc<CoordinateReferenceSystem>,
}

impl Geometry {
    /// Instantiate a geometry, checking that all of its positions share one dimension
    /// and that a point holds at most one position.
    ///
    /// The dimension is taken from the first sequence or member; `Xy` when there is none.
    pub fn new(shape: Shape, crs: Arc<CoordinateReferenceSystem>) -> GeomResult<Self> {
        let dimension = match &shape {
            Shape::GeometryCollection(members) => members.first().map(|g| g.dimension()),
            shape => shape.sequences().first().map(|s| s.dimension()),
        }
        .unwrap_or(DimensionalFlag::Xy);
        Self::with_dimension(shape, dimension, crs)
    }

    /// Instantiate a geometry with a declared dimension that every position must match
    pub fn with_dimension(
        shape: Shape,
        dimension: DimensionalFlag,
        crs: Arc<CoordinateReferenceSystem>,
    ) -> GeomResult<Self> {
        if let Shape::Point(seq) = &shape {
            if seq.len() > 1 {
                return Err(GeometryError::Precondition(format!(
                    "A Point holds at most one position, got {}",
                    seq.len()
                )));
            }
        }
        let geom = Self {
            shape,
            dimension,
            crs,
        };
        geom.check_dimension()?;
        Ok(geom)
    }

    pub fn point(pos: Position, crs: Arc<CoordinateReferenceSystem>) -> Self {
        Self {
            shape: Shape::Point(PositionSequence::single(pos)),
            dimension: pos.dimension(),
            crs,
        }
    }

    /// Instantiate an empty geometry that still remembers its dimension
    pub fn empty(
        geometry_type: GeometryType,
        dimension: DimensionalFlag,
        crs: Arc<CoordinateReferenceSystem>,
    ) -> Self {
        let empty = PositionSequence::empty(dimension);
        let shape = match geometry_type {
            GeometryType::Point => Shape::Point(empty),
            GeometryType::LineString => Shape::LineString(empty),
            GeometryType::LinearRing => Shape::LinearRing(empty),
            GeometryType::Polygon => Shape::Polygon(Vec::new()),
            GeometryType::MultiPoint => Shape::MultiPoint(empty),
            GeometryType::MultiLineString => Shape::MultiLineString(Vec::new()),
            GeometryType::MultiPolygon => Shape::MultiPolygon(Vec::new()),
            GeometryType::GeometryCollection => Shape::GeometryCollection(Vec::new()),
        };
        Self {
            shape,
            dimension,
            crs,
        }
    }

    pub fn line_string(
        positions: PositionSequence,
        crs: Arc<CoordinateReferenceSystem>,
    ) -> Self {
        Self {
            dimension: positions.dimension(),
            shape: Shape::LineString(positions),
            crs,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.shape.geometry_type()
    }

    pub fn crs(&self) -> &CoordinateReferenceSystem {
        &self.crs
    }

    /// Shared handle to the reference system, for building sibling geometries
    pub fn shared_crs(&self) -> Arc<CoordinateReferenceSystem> {
        Arc::clone(&self.crs)
    }

    /// Copy of the geometry, members included, referring to another reference system
    pub fn with_crs(&self, crs: Arc<CoordinateReferenceSystem>) -> Self {
        let shape = match &self.shape {
            Shape::GeometryCollection(members) => Shape::GeometryCollection(
                members.iter().map(|g| g.with_crs(Arc::clone(&crs))).collect(),
            ),
            shape => shape.clone(),
        };
        Self {
            shape,
            dimension: self.dimension,
            crs,
        }
    }

    /// Dimension of the geometry's positions
    pub fn dimension(&self) -> DimensionalFlag {
        self.dimension
    }

    /// True when the geometry holds no position at all
    pub fn is_empty(&self) -> bool {
        self.num_positions() == 0
    }

    /// Total number of positions, including those of nested geometries
    pub fn num_positions(&self) -> usize {
        match &self.shape {
            Shape::GeometryCollection(members) => members.iter().map(|g| g.num_positions()).sum(),
            shape => shape.sequences().iter().map(|s| s.len()).sum(),
        }
    }

    fn check_dimension(&self) -> GeomResult<()> {
        let expected = self.dimension;
        let mismatch = match &self.shape {
            Shape::GeometryCollection(members) => {
                members.iter().find(|g| g.dimension() != expected).map(|g| g.dimension())
            }
            shape => shape
                .sequences()
                .iter()
                .find(|s| s.dimension() != expected)
                .map(|s| s.dimension()),
        };
        match mismatch {
            Some(found) => Err(GeometryError::Precondition(format!(
                "Mixed dimensions in {}: expected {expected}, found {found}",
                self.geometry_type()
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Geometry {
    /// WKT representation of the geometry
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match wkt::to_wkt(self) {
            Ok(txt) => write!(f, "{txt}"),
            Err(_) => Err(fmt::Error),
        }
    }
}
