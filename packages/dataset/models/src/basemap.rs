//! Basemap styles and the map viewport.

use serde::{Deserialize, Serialize};

/// One of the selectable background tile styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basemap {
    #[default]
    OpenStreetMap,
    Positron,
    DarkMatter,
}

impl Basemap {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::Positron, Self::DarkMatter]
    }

    /// Name shown in the layer switcher.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::Positron => "Light (Positron)",
            Self::DarkMatter => "Dark (Dark Matter)",
        }
    }

    /// Tile provider identifier understood by the map widget.
    #[must_use]
    pub const fn tiles(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::Positron => "CartoDB positron",
            Self::DarkMatter => "CartoDB dark_matter",
        }
    }

    /// Finds a basemap by display name or tile identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|b| b.display_name() == name || b.tiles() == name)
    }

    /// Like [`Self::from_name`], falling back to the default basemap.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

/// Latitude of the default map centre (downtown Halifax).
pub const DEFAULT_CENTER_LAT: f64 = 44.649_605;
/// Longitude of the default map centre.
pub const DEFAULT_CENTER_LON: f64 = -63.592_300;
/// Default zoom level.
pub const DEFAULT_ZOOM: u8 = 13;

/// Centre and zoom of the map display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewport {
    /// Centre latitude.
    pub lat: f64,
    /// Centre longitude.
    pub lon: f64,
    /// Zoom level.
    pub zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            lat: DEFAULT_CENTER_LAT,
            lon: DEFAULT_CENTER_LON,
            zoom: DEFAULT_ZOOM,
        }
    }
}
