#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared vocabulary for the mobility map.
//!
//! Defines the six municipal datasets, the nine independently filterable
//! dimensions over them, the raw category [`Code`] type together with the
//! user-facing [`SelectionSet`] and its order-independent [`SelectionKey`],
//! and the static lookup tables (category labels, length buckets,
//! collision characteristics, basemaps) used by every other crate.

pub mod basemap;
pub mod bucket;
pub mod code;
pub mod collision;
pub mod labels;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use basemap::{Basemap, MapViewport};
pub use bucket::LengthBucket;
pub use code::{Code, SelectionKey, SelectionSet};
pub use collision::CollisionCharacteristic;

/// One of the municipal datasets shown on the map.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetId {
    /// Street junction points.
    Junctions,
    /// Traffic control locations (signals, stops, beacons).
    TrafficControls,
    /// Traffic-calming installations (humps, tables, bump-outs).
    TrafficCalming,
    /// Street lights.
    StreetLights,
    /// Street centreline segments.
    Centrelines,
    /// Collision records, partitioned into one file per year.
    Collisions,
}

impl DatasetId {
    /// Returns all variants in render order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Junctions,
            Self::TrafficControls,
            Self::Collisions,
            Self::TrafficCalming,
            Self::StreetLights,
            Self::Centrelines,
        ]
    }

    /// The single-file datasets that must load for the viewer to start.
    #[must_use]
    pub const fn required() -> &'static [Self] {
        &[
            Self::Junctions,
            Self::TrafficControls,
            Self::StreetLights,
            Self::TrafficCalming,
            Self::Centrelines,
        ]
    }

    /// Name used in the rendered summary.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Junctions => "Junctions",
            Self::TrafficControls => "Traffic controls",
            Self::TrafficCalming => "Traffic Calming",
            Self::StreetLights => "Street Lights",
            Self::Centrelines => "Street Centrelines",
            Self::Collisions => "Collisions",
        }
    }

    /// Prefix of every overlay layer name built from this dataset.
    #[must_use]
    pub const fn layer_prefix(self) -> &'static str {
        match self {
            Self::Junctions => "JunctionsLayer",
            Self::TrafficControls => "TrafficControlsLayer",
            Self::TrafficCalming => "TrafficCalmingLayer",
            Self::StreetLights => "StreetLightsLayer",
            Self::Centrelines => "StreetCentrelinesLayer",
            Self::Collisions => "TrafficCollisionsLayer",
        }
    }

    /// Filter dimensions that apply to this dataset, in layer-name order.
    #[must_use]
    pub const fn dimensions(self) -> &'static [Dimension] {
        match self {
            Self::Junctions => &[Dimension::JunctionType],
            Self::TrafficControls => &[Dimension::TrafficControlType],
            Self::TrafficCalming => &[Dimension::TrafficCalmingAssetCode],
            Self::StreetLights => &[Dimension::StreetLightUse, Dimension::StreetLightMaterial],
            Self::Centrelines => &[Dimension::CentrelineLength, Dimension::CentrelineClass],
            Self::Collisions => &[
                Dimension::CollisionYear,
                Dimension::CollisionCharacteristic,
            ],
        }
    }
}

/// An independently filterable attribute axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// Junction type code (`JUNCTION_T`).
    JunctionType,
    /// Traffic control type code (`CONTROL_TY`).
    TrafficControlType,
    /// Collision year (one file per year).
    CollisionYear,
    /// Collision characteristic flag (see [`CollisionCharacteristic`]).
    CollisionCharacteristic,
    /// Traffic-calming asset code (`ASSETCODE`).
    TrafficCalmingAssetCode,
    /// Street light use (`LIGHTUSE`).
    StreetLightUse,
    /// Street light pole material (`MAT`).
    StreetLightMaterial,
    /// Centreline length bucket (derived `length_bucket`).
    CentrelineLength,
    /// Centreline street classification (`st_class`).
    CentrelineClass,
}

impl Dimension {
    /// Returns all variants in form order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::JunctionType,
            Self::TrafficControlType,
            Self::CollisionYear,
            Self::CollisionCharacteristic,
            Self::TrafficCalmingAssetCode,
            Self::StreetLightUse,
            Self::StreetLightMaterial,
            Self::CentrelineLength,
            Self::CentrelineClass,
        ]
    }

    /// The dataset this dimension filters.
    #[must_use]
    pub const fn dataset(self) -> DatasetId {
        match self {
            Self::JunctionType => DatasetId::Junctions,
            Self::TrafficControlType => DatasetId::TrafficControls,
            Self::CollisionYear | Self::CollisionCharacteristic => DatasetId::Collisions,
            Self::TrafficCalmingAssetCode => DatasetId::TrafficCalming,
            Self::StreetLightUse | Self::StreetLightMaterial => DatasetId::StreetLights,
            Self::CentrelineLength | Self::CentrelineClass => DatasetId::Centrelines,
        }
    }

    /// The attribute column an equality filter on this dimension reads.
    ///
    /// `None` for the collision dimensions: years select files and
    /// characteristics each map to their own flag column.
    #[must_use]
    pub const fn column(self) -> Option<&'static str> {
        match self {
            Self::JunctionType => Some("JUNCTION_T"),
            Self::TrafficControlType => Some("CONTROL_TY"),
            Self::CollisionYear | Self::CollisionCharacteristic => None,
            Self::TrafficCalmingAssetCode => Some("ASSETCODE"),
            Self::StreetLightUse => Some("LIGHTUSE"),
            Self::StreetLightMaterial => Some("MAT"),
            Self::CentrelineLength => Some("length_bucket"),
            Self::CentrelineClass => Some("st_class"),
        }
    }

    /// Heading shown next to the form control.
    #[must_use]
    pub const fn control_label(self) -> &'static str {
        match self {
            Self::JunctionType => "Junctions",
            Self::TrafficControlType => "Traffic Controls",
            Self::CollisionYear => "Collisions (year)",
            Self::CollisionCharacteristic => "Collisions (type)",
            Self::TrafficCalmingAssetCode => "Traffic Calming",
            Self::StreetLightUse => "Street Lights (Use)",
            Self::StreetLightMaterial => "Street Lights (Material)",
            Self::CentrelineLength => "Street Segments (Length)",
            Self::CentrelineClass => "Street Segments (Classification)",
        }
    }

    /// Background colour of the form control heading.
    #[must_use]
    pub const fn control_color(self) -> &'static str {
        match self {
            Self::JunctionType => "#1976d2",
            Self::TrafficControlType => "#d32f2f",
            Self::CollisionYear | Self::CollisionCharacteristic => "#ff9800",
            Self::TrafficCalmingAssetCode => "#008080",
            Self::StreetLightUse | Self::StreetLightMaterial => "#DAA520",
            Self::CentrelineLength | Self::CentrelineClass => "#1565c0",
        }
    }
}
