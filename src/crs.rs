use super::core::{GeomResult, GeometryError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const CRS_ID: &str = r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*:\s*(-?\d+)\s*$";

static CRS_ID_RE: OnceLock<Regex> = OnceLock::new();

// Get the authority:code regex once to avoid recompilation (thread-safe)
fn crs_id_re() -> &'static Regex {
    CRS_ID_RE.get_or_init(|| Regex::new(CRS_ID).unwrap())
}

/// Identifier of a coordinate reference system: an authority plus a numeric code
///
/// Examples
/// ```rust
/// use geoser::CrsId;
/// let id: CrsId = "epsg:4326".parse().unwrap();
/// assert_eq!(id.to_string(), "EPSG:4326");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CrsId {
    authority: String,
    code: i32,
}

impl CrsId {
    pub const DEFAULT_AUTHORITY: &'static str = "EPSG";

    /// Identifier used when a geometry has no known reference system
    pub const UNDEFINED_CODE: i32 = -1;

    pub fn new(authority: &str, code: i32) -> Self {
        Self {
            authority: authority.to_uppercase(),
            code,
        }
    }

    pub fn epsg(code: i32) -> Self {
        Self::new(Self::DEFAULT_AUTHORITY, code)
    }

    pub fn undefined() -> Self {
        Self::epsg(Self::UNDEFINED_CODE)
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn is_undefined(&self) -> bool {
        self.code == Self::UNDEFINED_CODE
    }
}

impl fmt::Display for CrsId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl FromStr for CrsId {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeomResult<Self> {
        let Some(cap) = crs_id_re().captures(s) else {
            return Err(GeometryError::Precondition(format!(
                "Expected a CRS identifier of the form AUTHORITY:CODE, got '{s}'"
            )));
        };
        let code = cap[2].parse::<i32>().map_err(|e| {
            GeometryError::Precondition(format!("Invalid CRS code '{}': {e}", &cap[2]))
        })?;
        Ok(Self::new(&cap[1], code))
    }
}

/// A coordinate reference system as seen by the serializers.
///
/// Geometries hold it behind an `Arc`; only the identifier reaches the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinateReferenceSystem {
    id: CrsId,
    name: String,
}

impl CoordinateReferenceSystem {
    pub fn new(id: CrsId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    /// A reference system known only by its identifier
    pub fn from_id(id: CrsId) -> Self {
        let name = id.to_string();
        Self { id, name }
    }

    /// Geographic WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(CrsId::epsg(4326), "WGS 84")
    }

    pub fn undefined() -> Self {
        Self::new(CrsId::undefined(), "Undefined")
    }

    pub fn crs_id(&self) -> &CrsId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CoordinateReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs_id_valid() {
        let id: CrsId = "EPSG:4326".parse().unwrap();
        assert_eq!(id.authority(), "EPSG");
        assert_eq!(id.code(), 4326);

        let id: CrsId = " epsg : 31370 ".parse().unwrap();
        assert_eq!(id.to_string(), "EPSG:31370");

        let id: CrsId = "EPSG:-1".parse().unwrap();
        assert!(id.is_undefined());
    }

    #[test]
    fn test_parse_crs_id_invalid() {
        for raw in ["4326", "EPSG:", ":4326", "EPSG:43.26", "EPSG 4326", "EPSG:99999999999"] {
            if let Ok(id) = raw.parse::<CrsId>() {
                panic!("Parsed invalid CRS identifier '{raw}' as {id}");
            }
        }
    }

    #[test]
    fn test_crs_display_uses_id() {
        assert_eq!(CoordinateReferenceSystem::wgs84().to_string(), "EPSG:4326");
        assert_eq!(CoordinateReferenceSystem::undefined().to_string(), "EPSG:-1");
    }
}
