use super::serialization::*;
use super::*;
use std::io::{self, Write};
use std::sync::Arc;

/// Parse an input string and print its WKT token stream, one token per line
pub fn show_tokens(input: String) -> Result<(), String> {
    let geom = parse_wkt(&input).map_err(|e| format!("Failed to parse WKT: {e}"))?;
    println!(
        "Parsed a Geometry of Type {} ({}, {} positions)",
        geom.geometry_type().camel_case(),
        geom.dimension(),
        geom.num_positions()
    );
    for token in tokenize(&geom) {
        println!("{token:?}");
    }
    Ok(())
}

/// Parse an input string and print it back as normalised WKT
pub fn normalize_wkt(input: String) -> Result<(), String> {
    let geom = parse_wkt(&input).map_err(|e| format!("Failed to parse WKT: {e}"))?;
    let txt = to_wkt(&geom).map_err(|e| format!("Failed to render WKT: {e}"))?;
    println!("{txt}");
    Ok(())
}

/// Parse an input string and print the GeoJSON representation of the geometry
pub fn print_geojson(
    input: String,
    suppress_crs: bool,
    pretty: bool,
    crs_override: Option<String>,
) -> Result<(), String> {
    let mut geom = parse_wkt(&input).map_err(|e| format!("Failed to parse WKT: {e}"))?;
    if let Some(raw) = crs_override {
        let id: CrsId = raw.parse().map_err(|e| format!("Invalid --crs value: {e}"))?;
        geom = geom.with_crs(Arc::new(CoordinateReferenceSystem::from_id(id)));
    }

    let context = if suppress_crs {
        SerializationContext::new().with_feature(Feature::SuppressCrsSerialization)
    } else {
        SerializationContext::new()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if pretty {
        let mut sink = JsonWriterSink::pretty(&mut out);
        serialize(&geom, &mut sink, &context)
    } else {
        let mut sink = JsonWriterSink::compact(&mut out);
        serialize(&geom, &mut sink, &context)
    };
    match written {
        Err(e) => Err(format!("Failed to write GeoJSON: {e}")),
        Ok(_) => writeln!(out).map_err(|e| format!("Failed to write to stdout: {e}")),
    }
}
