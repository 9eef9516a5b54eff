//! GeoJSON encoding through a push-style [`JsonSink`].
mod context;
mod encoder;
mod sink;

pub use context::{Feature, SerializationContext};
pub use encoder::serialize;
pub use sink::{JsonSink, JsonWriterSink, ValueSink};

use crate::core::GeomResult;
use crate::geometry::Geometry;
use std::io;

/// Serialize a geometry to a compact GeoJSON string
///
/// Examples
/// ```rust
/// use geoser::serialization::{parse_wkt, to_geojson_string, Feature, SerializationContext};
///
/// let geom = parse_wkt("LINESTRING (0 0, 1 1, 2 2)").unwrap();
/// let ctx = SerializationContext::new().with_feature(Feature::SuppressCrsSerialization);
/// assert_eq!(
///     to_geojson_string(&geom, &ctx).unwrap(),
///     r#"{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0],[2.0,2.0]]}"#
/// );
/// ```
pub fn to_geojson_string(geometry: &Geometry, context: &SerializationContext) -> GeomResult<String> {
    let mut sink = JsonWriterSink::compact(Vec::new());
    serialize(geometry, &mut sink, context)?;
    let txt = String::from_utf8(sink.into_inner())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(txt)
}
