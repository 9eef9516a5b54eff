use super::geometry::GeometryType;
use std::io;
use thiserror::Error;

/// Errors raised while building, reading or serializing geometries
#[derive(Error, Debug)]
pub enum GeometryError {
    /// Invalid input handed to a constructor or entry point.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Malformed WKT text or token stream.
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// The geometry type has no GeoJSON coordinate-nesting rule.
    #[error("Unsupported geometry type for GeoJSON coordinates: {0}")]
    UnsupportedGeometryType(GeometryType),

    /// Failure reported by the output sink.
    #[error(transparent)]
    Sink(#[from] io::Error),
}

pub type GeomResult<T> = Result<T, GeometryError>;

// Tolerances for comparing parsed ordinates in tests
#[cfg(test)]
const ATOL: f64 = 1e-12;
#[cfg(test)]
const RTOL: f64 = 1e-9;

/// Determine if two values are approximately equal to one another.
#[cfg(test)]
pub(crate) fn approx(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() < (ATOL + RTOL * scale)
}
