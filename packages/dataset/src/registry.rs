//! Dataset registry: definitions embedded from TOML at compile time.
//!
//! Each `.toml` file in `packages/dataset/datasets/` describes where one
//! dataset lives relative to the data root, how its columns are
//! normalized on load, and how its features are styled on the map.

use std::sync::LazyLock;

use mobility_map_dataset_models::DatasetId;
use serde::{Deserialize, Serialize};

/// A complete, config-driven dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Which dataset this is.
    pub id: DatasetId,
    /// Human-readable name for logs and the CLI.
    pub name: String,
    /// Where the features come from.
    pub source: SourceConfig,
    /// Column normalization applied after reading.
    #[serde(default)]
    pub columns: ColumnRules,
    /// Map styling for features of this dataset.
    pub style: LayerStyle,
}

/// Location of a dataset's features, relative to the data root.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One GeoJSON file.
    File {
        /// Relative path of the file.
        path: String,
    },
    /// A directory holding one file per year named `{prefix}{year}.{extension}`.
    YearPartitioned {
        /// Relative path of the directory.
        directory: String,
        /// File name prefix before the year.
        prefix: String,
        /// File extension after the year, without the dot.
        extension: String,
    },
}

/// Column normalization applied once at load time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnRules {
    /// Lower-case every column name.
    #[serde(default)]
    pub lowercase: bool,
    /// Columns whose empty or missing values become [`UNKNOWN_SENTINEL`].
    #[serde(default)]
    pub unknown_fill: Vec<String>,
    /// Compute `length_m` and `length_bucket` from the line geometry.
    #[serde(default)]
    pub measure_length: bool,
}

/// Replacement for blank category values.
pub const UNKNOWN_SENTINEL: &str = "UNKN";

/// How features of a dataset are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerStyle {
    /// Circle markers.
    Point {
        /// Stroke and fill colour.
        color: String,
        /// Marker radius in pixels.
        radius: f64,
    },
    /// Polylines.
    Line {
        /// Stroke colour.
        color: String,
        /// Stroke width in pixels.
        weight: f64,
        /// Stroke opacity, 0 to 1.
        opacity: f64,
    },
}

const DATASET_TOMLS: &[(&str, &str)] = &[
    ("junctions", include_str!("../datasets/junctions.toml")),
    (
        "traffic_controls",
        include_str!("../datasets/traffic_controls.toml"),
    ),
    (
        "traffic_calming",
        include_str!("../datasets/traffic_calming.toml"),
    ),
    ("street_lights", include_str!("../datasets/street_lights.toml")),
    ("centrelines", include_str!("../datasets/centrelines.toml")),
    ("collisions", include_str!("../datasets/collisions.toml")),
];

static DEFINITIONS: LazyLock<Vec<DatasetDefinition>> = LazyLock::new(|| {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
});

/// Returns every dataset definition.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_definitions() -> &'static [DatasetDefinition] {
    &DEFINITIONS
}

/// Returns the definition for `id`.
///
/// # Panics
///
/// Panics if no embedded config defines `id`; the registry tests
/// guarantee every [`DatasetId`] is covered.
#[must_use]
pub fn definition(id: DatasetId) -> &'static DatasetDefinition {
    all_definitions()
        .iter()
        .find(|d| d.id == id)
        .unwrap_or_else(|| panic!("No dataset definition for {id}"))
}
