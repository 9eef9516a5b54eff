use super::context::{Feature, SerializationContext};
use super::sink::JsonSink;
use crate::core::{GeomResult, GeometryError};
use crate::crs::CoordinateReferenceSystem;
use crate::geometry::{Geometry, Shape};
use crate::positions::{Position, PositionSequence};

/// Serialize a geometry as a GeoJSON object into the sink.
///
/// Members are always written in the order `type`, `crs` (unless the context sets
/// `SuppressCrsSerialization`), `coordinates`. An empty geometry gets `[]` as
/// coordinates whatever its type. Nested members of a geometry collection are
/// written as complete geometry objects under the same context.
///
/// Examples
/// ```rust
/// use std::sync::Arc;
/// use geoser::serialization::{serialize, JsonWriterSink, SerializationContext};
/// use geoser::{CoordinateReferenceSystem, Geometry, Position};
///
/// let pt = Geometry::point(Position::new(10.0, 20.0), Arc::new(CoordinateReferenceSystem::wgs84()));
/// let mut sink = JsonWriterSink::compact(Vec::new());
/// serialize(&pt, &mut sink, &SerializationContext::default()).unwrap();
/// assert_eq!(
///     String::from_utf8(sink.into_inner()).unwrap(),
///     r#"{"type":"Point","crs":{"type":"name","properties":{"name":"EPSG:4326"}},"coordinates":[10.0,20.0]}"#
/// );
/// ```
pub fn serialize<S>(
    geometry: &Geometry,
    sink: &mut S,
    context: &SerializationContext,
) -> GeomResult<()>
where
    S: JsonSink + ?Sized,
{
    log::debug!(
        "Serializing {} to GeoJSON ({} positions)",
        geometry.geometry_type(),
        geometry.num_positions()
    );
    sink.write_object_start()?;
    sink.write_string_field("type", geometry.geometry_type().camel_case())?;
    write_crs(sink, geometry.crs(), context)?;
    write_coordinates(sink, geometry, context)?;
    sink.write_object_end()?;
    Ok(())
}

fn write_crs<S: JsonSink + ?Sized>(
    sink: &mut S,
    crs: &CoordinateReferenceSystem,
    context: &SerializationContext,
) -> GeomResult<()> {
    if context.is_feature_set(Feature::SuppressCrsSerialization) {
        return Ok(());
    }
    sink.write_field_name("crs")?;
    sink.write_object_start()?;
    sink.write_string_field("type", "name")?;
    sink.write_field_name("properties")?;
    sink.write_object_start()?;
    sink.write_string_field("name", &crs.crs_id().to_string())?;
    sink.write_object_end()?;
    sink.write_object_end()?;
    Ok(())
}

// How the coordinates member of a geometry is laid out
enum Nesting<'a> {
    Empty,
    Position(&'a Position),
    Positions(&'a PositionSequence),
    PositionLists(&'a [PositionSequence]),
    Polygons(&'a [Vec<PositionSequence>]),
    Geometries(&'a [Geometry]),
}

fn nesting(geometry: &Geometry) -> GeomResult<Nesting<'_>> {
    if geometry.is_empty() {
        return Ok(Nesting::Empty);
    }
    let nesting = match geometry.shape() {
        Shape::Point(seq) => seq.get(0).map_or(Nesting::Empty, Nesting::Position),
        Shape::LineString(seq) | Shape::MultiPoint(seq) => Nesting::Positions(seq),
        Shape::Polygon(rings) | Shape::MultiLineString(rings) => Nesting::PositionLists(rings),
        Shape::MultiPolygon(polygons) => Nesting::Polygons(polygons),
        Shape::GeometryCollection(members) => Nesting::Geometries(members),
        Shape::LinearRing(_) => {
            return Err(GeometryError::UnsupportedGeometryType(
                geometry.geometry_type(),
            ));
        }
    };
    Ok(nesting)
}

fn write_coordinates<S: JsonSink + ?Sized>(
    sink: &mut S,
    geometry: &Geometry,
    context: &SerializationContext,
) -> GeomResult<()> {
    // Resolved before the member name so an unsupported type leaves no dangling field
    let nesting = nesting(geometry)?;
    sink.write_field_name("coordinates")?;
    match nesting {
        Nesting::Empty => {
            sink.write_array_start()?;
            sink.write_array_end()?;
        }
        Nesting::Position(pos) => sink.write_number_array(pos.ordinates())?,
        Nesting::Positions(seq) => write_positions(sink, seq)?,
        Nesting::PositionLists(seqs) => write_position_lists(sink, seqs)?,
        Nesting::Polygons(polygons) => {
            sink.write_array_start()?;
            for rings in polygons {
                write_position_lists(sink, rings)?;
            }
            sink.write_array_end()?;
        }
        Nesting::Geometries(members) => {
            sink.write_array_start()?;
            for member in members {
                log::trace!("Serializing collection member {}", member.geometry_type());
                serialize(member, sink, context)?;
            }
            sink.write_array_end()?;
        }
    }
    Ok(())
}

// One coordinate tuple per position; an empty sequence gives []
fn write_positions<S: JsonSink + ?Sized>(sink: &mut S, seq: &PositionSequence) -> GeomResult<()> {
    sink.write_array_start()?;
    for pos in seq {
        sink.write_number_array(pos.ordinates())?;
    }
    sink.write_array_end()?;
    Ok(())
}

fn write_position_lists<S: JsonSink + ?Sized>(
    sink: &mut S,
    seqs: &[PositionSequence],
) -> GeomResult<()> {
    sink.write_array_start()?;
    for seq in seqs {
        write_positions(sink, seq)?;
    }
    sink.write_array_end()?;
    Ok(())
}
