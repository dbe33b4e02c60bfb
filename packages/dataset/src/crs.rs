//! Coordinate reference system detection and reprojection.
//!
//! RFC 7946 GeoJSON is always WGS84 longitude/latitude, but exports from
//! desktop GIS tools still carry the legacy `crs` member and may hold
//! projected coordinates (UTM metres for the municipal exports). Anything
//! that is not WGS84 is reprojected on load through `proj4rs`, so every
//! dataset shares one display system.

use geo::{Coord, Geometry, MapCoords};
use proj4rs::errors::Error as ProjError;
use proj4rs::proj::Proj;

/// EPSG code of WGS84 longitude/latitude.
pub const WGS84_EPSG: u16 = 4326;

/// A coordinate reference system named by a GeoJSON `crs` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Geographic WGS84 longitude/latitude (EPSG:4326 or CRS84).
    Wgs84,
    /// Any other EPSG-registered system.
    Epsg(u16),
}

impl Crs {
    /// Parses a CRS name such as `"EPSG:26920"`,
    /// `"urn:ogc:def:crs:EPSG::4326"` or `"urn:ogc:def:crs:OGC:1.3:CRS84"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.ends_with("CRS84") {
            return Some(Self::Wgs84);
        }
        let code: u16 = name.rsplit(':').next()?.parse().ok()?;
        Some(if code == WGS84_EPSG {
            Self::Wgs84
        } else {
            Self::Epsg(code)
        })
    }

    /// Reads the legacy `crs` member of a feature collection.
    ///
    /// A missing member means WGS84.
    ///
    /// # Errors
    ///
    /// Returns the member as written when it names no EPSG code.
    pub fn from_foreign_members(members: Option<&geojson::JsonObject>) -> Result<Self, String> {
        let Some(crs) = members.and_then(|m| m.get("crs")) else {
            return Ok(Self::Wgs84);
        };
        let name = crs
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(serde_json::Value::as_str);
        match name {
            Some(name) => Self::from_name(name).ok_or_else(|| name.to_string()),
            None => Err(crs.to_string()),
        }
    }

    /// The transformation from this system to WGS84; `None` when no
    /// reprojection is needed.
    ///
    /// # Errors
    ///
    /// Returns the `proj4rs` error when the code has no known definition.
    pub fn reprojector(self) -> Result<Option<Reprojector>, ProjError> {
        match self {
            Self::Wgs84 => Ok(None),
            Self::Epsg(code) => Reprojector::from_epsg(code).map(Some),
        }
    }
}

/// Reprojects geometries from one EPSG system to WGS84 degrees.
pub struct Reprojector {
    source: Proj,
    target: Proj,
}

impl Reprojector {
    /// Builds the transformation from EPSG `code` to WGS84.
    ///
    /// # Errors
    ///
    /// Returns the `proj4rs` error when `code` has no known definition.
    pub fn from_epsg(code: u16) -> Result<Self, ProjError> {
        Ok(Self {
            source: Proj::from_epsg_code(code)?,
            target: Proj::from_epsg_code(WGS84_EPSG)?,
        })
    }

    /// Converts one coordinate to WGS84 longitude/latitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns the `proj4rs` error when the point falls outside the
    /// source projection's domain.
    pub fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjError> {
        // proj4rs takes and returns geographic coordinates in radians
        let mut point = if self.source.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        proj4rs::transform::transform(&self.source, &self.target, &mut point)?;
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }

    /// Converts every coordinate of `geometry` to WGS84.
    ///
    /// # Errors
    ///
    /// Returns the first coordinate that fails to reproject.
    pub fn to_wgs84(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, ProjError> {
        geometry.try_map_coords(|coord| self.coord(coord))
    }
}
