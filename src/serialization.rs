use super::core::GeomResult;
pub mod json;
pub mod wkt;

pub use json::{
    Feature, JsonSink, JsonWriterSink, SerializationContext, ValueSink, serialize,
    to_geojson_string,
};
pub use wkt::{WktToken, parse_wkt, render, to_wkt, tokenize};

type ParserResult<'a, T> = GeomResult<(T, &'a str)>;
