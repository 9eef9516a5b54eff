use super::token::WktToken;
use crate::geometry::{Geometry, Shape};
use crate::positions::PositionSequence;

/// Break a geometry down into the ordered token stream of its WKT representation.
///
/// Every geometry (including the members of a collection) starts with its tag and
/// dimension marker, followed by `Empty` or a parenthesised body. The stream ends
/// with a single `End` token.
///
/// Examples
/// ```rust
/// use std::sync::Arc;
/// use geoser::serialization::{tokenize, WktToken};
/// use geoser::{CoordinateReferenceSystem, DimensionalFlag, Geometry, GeometryType};
///
/// let crs = Arc::new(CoordinateReferenceSystem::wgs84());
/// let empty = Geometry::empty(GeometryType::LineString, DimensionalFlag::Xym, crs);
/// let tokens = tokenize(&empty);
/// assert_eq!(
///     tokens,
///     vec![
///         WktToken::geometry_tag(GeometryType::LineString, true),
///         WktToken::dimension_marker(DimensionalFlag::Xym),
///         WktToken::empty(),
///         WktToken::end(),
///     ]
/// );
/// ```
pub fn tokenize(geometry: &Geometry) -> Vec<WktToken<'_>> {
    log::debug!(
        "Tokenizing {} with {} positions",
        geometry.geometry_type(),
        geometry.num_positions()
    );
    let mut tokenizer = Tokenizer { tokens: Vec::new() };
    tokenizer.geometry(geometry);
    tokenizer.tokens.push(WktToken::end());
    tokenizer.tokens
}

struct Tokenizer<'a> {
    tokens: Vec<WktToken<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn geometry(&mut self, geometry: &'a Geometry) {
        let dimension = geometry.dimension();
        self.tokens.push(WktToken::geometry_tag(
            geometry.geometry_type(),
            dimension.is_measured(),
        ));
        self.tokens.push(WktToken::dimension_marker(dimension));

        // Only an empty outer list is EMPTY; empty members keep their own tokens
        match geometry.shape() {
            Shape::Point(seq)
            | Shape::LineString(seq)
            | Shape::LinearRing(seq)
            | Shape::MultiPoint(seq) => self.sequence(seq),
            Shape::Polygon(rings) | Shape::MultiLineString(rings) => self.sequences(rings),
            Shape::MultiPolygon(polygons) => {
                self.list(polygons, |tk, rings| tk.sequences(rings));
            }
            Shape::GeometryCollection(members) => {
                self.list(members, |tk, member| {
                    log::trace!("Tokenizing collection member {}", member.geometry_type());
                    tk.geometry(member)
                });
            }
        }
    }

    // A single parenthesised position sequence, or EMPTY
    fn sequence(&mut self, seq: &'a PositionSequence) {
        if seq.is_empty() {
            self.tokens.push(WktToken::empty());
            return;
        }
        self.tokens.push(WktToken::start_list());
        self.tokens.push(WktToken::point_sequence(seq));
        self.tokens.push(WktToken::end_list());
    }

    fn sequences(&mut self, seqs: &'a [PositionSequence]) {
        self.list(seqs, |tk, seq| tk.sequence(seq));
    }

    // Parenthesised, separated list of elements; an empty list is EMPTY
    fn list<T, F>(&mut self, items: &'a [T], mut element: F)
    where
        F: FnMut(&mut Self, &'a T),
    {
        if items.is_empty() {
            self.tokens.push(WktToken::empty());
            return;
        }
        self.tokens.push(WktToken::start_list());
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.tokens.push(WktToken::element_separator());
            }
            element(self, item);
        }
        self.tokens.push(WktToken::end_list());
    }
}
