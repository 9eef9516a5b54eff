use super::core::{GeomResult, GeometryError};
use std::fmt;
use std::slice::Iter;

/// Marks which ordinates beyond X and Y a position carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionalFlag {
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl DimensionalFlag {
    /// Build the flag from the presence of the Z and M ordinates
    pub fn new(is_3d: bool, is_measured: bool) -> Self {
        match (is_3d, is_measured) {
            (false, false) => Self::Xy,
            (true, false) => Self::Xyz,
            (false, true) => Self::Xym,
            (true, true) => Self::Xyzm,
        }
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Xyz | Self::Xyzm)
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Xym | Self::Xyzm)
    }

    /// Total number of ordinates in a position of this dimension
    pub fn coordinate_dimension(&self) -> usize {
        match self {
            Self::Xy => 2,
            Self::Xyz | Self::Xym => 3,
            Self::Xyzm => 4,
        }
    }
}

impl fmt::Display for DimensionalFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Xy => write!(f, "XY"),
            Self::Xyz => write!(f, "XYZ"),
            Self::Xym => write!(f, "XYM"),
            Self::Xyzm => write!(f, "XYZM"),
        }
    }
}

/// A single coordinate tuple with X, Y and optional Z and M ordinates
///
/// Examples
/// ```rust
/// use geoser::Position;
/// let pos = Position::xyz(1.0, 2.0, 3.0);
/// assert_eq!(pos.ordinates(), &[1.0, 2.0, 3.0]);
/// assert_eq!(pos.m(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    ordinates: [f64; 4],
    dimension: DimensionalFlag,
}

impl Position {
    /// Instantiate a 2D position
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            ordinates: [x, y, 0.0, 0.0],
            dimension: DimensionalFlag::Xy,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            ordinates: [x, y, z, 0.0],
            dimension: DimensionalFlag::Xyz,
        }
    }

    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Self {
            ordinates: [x, y, m, 0.0],
            dimension: DimensionalFlag::Xym,
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            ordinates: [x, y, z, m],
            dimension: DimensionalFlag::Xyzm,
        }
    }

    /// Instantiate a position from its ordinates in native order (X, Y[, Z][, M]).
    ///
    /// Fails if the number of ordinates does not match the dimension.
    pub fn from_ordinates(dimension: DimensionalFlag, ordinates: &[f64]) -> GeomResult<Self> {
        if ordinates.len() != dimension.coordinate_dimension() {
            return Err(GeometryError::Precondition(format!(
                "A {dimension} position needs {} ordinates, got {}",
                dimension.coordinate_dimension(),
                ordinates.len()
            )));
        }
        let mut buf = [0.0; 4];
        buf[..ordinates.len()].copy_from_slice(ordinates);
        Ok(Self {
            ordinates: buf,
            dimension,
        })
    }

    pub fn dimension(&self) -> DimensionalFlag {
        self.dimension
    }

    pub fn x(&self) -> f64 {
        self.ordinates[0]
    }

    pub fn y(&self) -> f64 {
        self.ordinates[1]
    }

    pub fn z(&self) -> Option<f64> {
        self.dimension.is_3d().then_some(self.ordinates[2])
    }

    pub fn m(&self) -> Option<f64> {
        match self.dimension {
            DimensionalFlag::Xym => Some(self.ordinates[2]),
            DimensionalFlag::Xyzm => Some(self.ordinates[3]),
            _ => None,
        }
    }

    /// The ordinates in native order; the length equals the coordinate dimension
    pub fn ordinates(&self) -> &[f64] {
        &self.ordinates[..self.dimension.coordinate_dimension()]
    }

    /// Return true if the position is approximately equal to other.
    #[cfg(test)]
    pub(crate) fn is_close(&self, other: &Position) -> bool {
        self.dimension == other.dimension
            && self
                .ordinates()
                .iter()
                .zip(other.ordinates())
                .all(|(a, b)| crate::core::approx(*a, *b))
    }
}

/// An ordered, possibly empty run of positions sharing one dimension
#[derive(Clone, Debug, PartialEq)]
pub struct PositionSequence {
    dimension: DimensionalFlag,
    positions: Vec<Position>,
}

impl PositionSequence {
    /// Instantiate a sequence, checking every position against the dimension
    ///
    /// Example
    /// ```rust
    /// use geoser::{DimensionalFlag, Position, PositionSequence};
    /// let seq = PositionSequence::new(
    ///     DimensionalFlag::Xy,
    ///     vec![Position::new(0.0, 0.0), Position::new(1.0, 1.0)],
    /// ).unwrap();
    /// assert_eq!(seq.len(), 2);
    ///
    /// assert!(PositionSequence::new(DimensionalFlag::Xy, vec![Position::xyz(0.0, 0.0, 1.0)]).is_err());
    /// ```
    pub fn new(dimension: DimensionalFlag, positions: Vec<Position>) -> GeomResult<Self> {
        if let Some((idx, pos)) = positions
            .iter()
            .enumerate()
            .find(|(_, p)| p.dimension() != dimension)
        {
            return Err(GeometryError::Precondition(format!(
                "Position {idx} has dimension {} but the sequence is {dimension}",
                pos.dimension()
            )));
        }
        Ok(Self {
            dimension,
            positions,
        })
    }

    /// Instantiate a sequence taking the dimension from its first position.
    ///
    /// An empty vector gives an empty 2D sequence.
    pub fn from_positions(positions: Vec<Position>) -> GeomResult<Self> {
        let dimension = positions
            .first()
            .map_or(DimensionalFlag::Xy, |p| p.dimension());
        Self::new(dimension, positions)
    }

    /// A sequence holding exactly one position
    pub fn single(pos: Position) -> Self {
        Self {
            dimension: pos.dimension(),
            positions: vec![pos],
        }
    }

    pub fn empty(dimension: DimensionalFlag) -> Self {
        Self {
            dimension,
            positions: Vec::new(),
        }
    }

    pub fn dimension(&self) -> DimensionalFlag {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Position> {
        self.positions.get(idx)
    }

    pub fn iter(&self) -> Iter<'_, Position> {
        self.positions.iter()
    }
}

impl<'a> IntoIterator for &'a PositionSequence {
    type Item = &'a Position;
    type IntoIter = Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
