//! WKT support: the token model, the tokenizer producing it from a geometry, a
//! renderer for token streams and a reader for WKT/EWKT text.
mod reader;
mod token;
mod tokenizer;
mod writer;

pub use reader::parse_wkt;
pub use token::WktToken;
pub use tokenizer::tokenize;
pub use writer::render;

use crate::core::GeomResult;
use crate::geometry::Geometry;

/// WKT representation of a geometry
///
/// Examples
/// ```rust
/// use geoser::serialization::{parse_wkt, to_wkt};
///
/// let geom = parse_wkt("MULTIPOINT ((1 2), (3 4))").unwrap();
/// assert_eq!(to_wkt(&geom).unwrap(), "MULTIPOINT (1 2, 3 4)");
/// ```
pub fn to_wkt(geometry: &Geometry) -> GeomResult<String> {
    render(&tokenize(geometry))
}
