use crate::geometry::GeometryType;
use crate::positions::{DimensionalFlag, PositionSequence};

/// A lexical unit of a WKT representation.
///
/// Tokens carry data only; a renderer decides how each one maps to text. Marker
/// variants have no payload, so any two of the same variant are interchangeable.
///
/// Examples
/// ```rust
/// use geoser::serialization::WktToken;
/// use geoser::GeometryType;
///
/// let tag = WktToken::geometry_tag(GeometryType::LineString, true);
/// assert_eq!(tag.geometry_type(), Some(GeometryType::LineString));
/// assert!(tag.is_measured());
/// assert_eq!(WktToken::start_list(), WktToken::start_list());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum WktToken<'a> {
    /// Type of the geometry and whether its positions carry an M ordinate
    GeometryTag {
        geometry_type: GeometryType,
        measured: bool,
    },
    StartList,
    EndList,
    Empty,
    ElementSeparator,
    /// Terminates a complete WKT document
    End,
    /// A whole position sequence; the renderer decides how to lay out the ordinates
    PointSequence(&'a PositionSequence),
    DimensionMarker(DimensionalFlag),
    Text(String),
    Number(f64),
}

impl<'a> WktToken<'a> {
    /// The token identifying the geometry type. Presence of Z is signaled by a
    /// separate dimension marker.
    pub fn geometry_tag(geometry_type: GeometryType, measured: bool) -> Self {
        Self::GeometryTag {
            geometry_type,
            measured,
        }
    }

    pub fn start_list() -> Self {
        Self::StartList
    }

    pub fn end_list() -> Self {
        Self::EndList
    }

    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn element_separator() -> Self {
        Self::ElementSeparator
    }

    pub fn end() -> Self {
        Self::End
    }

    pub fn point_sequence(positions: &'a PositionSequence) -> Self {
        Self::PointSequence(positions)
    }

    pub fn dimension_marker(flag: DimensionalFlag) -> Self {
        Self::DimensionMarker(flag)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        match self {
            Self::GeometryTag { geometry_type, .. } => Some(*geometry_type),
            _ => None,
        }
    }

    /// True for a geometry tag or dimension marker that announces an M ordinate
    pub fn is_measured(&self) -> bool {
        match self {
            Self::GeometryTag { measured, .. } => *measured,
            Self::DimensionMarker(flag) => flag.is_measured(),
            _ => false,
        }
    }

    /// True for a dimension marker that announces a Z ordinate
    pub fn is_3d(&self) -> bool {
        match self {
            Self::DimensionMarker(flag) => flag.is_3d(),
            _ => false,
        }
    }

    pub fn points(&self) -> Option<&'a PositionSequence> {
        match self {
            Self::PointSequence(seq) => Some(*seq),
            _ => None,
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(txt) => Some(txt.as_str()),
            _ => None,
        }
    }

    pub fn number_value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}
