#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset loading for the mobility map.
//!
//! Reads the municipal GeoJSON datasets described by the embedded
//! [`registry`], reprojects them to WGS84 longitude/latitude, derives
//! computed columns (unknown sentinels, centreline ground length and
//! length bucket) and memoizes each loaded [`FeatureDataset`] for the
//! lifetime of the process. Collision records are partitioned into one
//! file per year and are served by the [`CollisionYearIndex`].

pub mod catalog;
pub mod collisions;
pub mod crs;
pub mod feature;
pub mod loader;
pub mod progress;
pub mod registry;

use std::path::PathBuf;

use mobility_map_dataset_models::DatasetId;

pub use catalog::Catalog;
pub use collisions::{CollisionTotals, CollisionYearIndex, YearUnion};
pub use feature::{Feature, FeatureDataset};
pub use loader::DatasetLoader;

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The backing file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid GeoJSON.
    #[error("Failed to parse GeoJSON in {}: {source}", path.display())]
    GeoJson {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: geojson::Error,
    },

    /// The backing file is GeoJSON but not a `FeatureCollection`.
    #[error("{} is not a GeoJSON FeatureCollection", path.display())]
    NotFeatureCollection {
        /// Offending file.
        path: PathBuf,
    },

    /// The file names a coordinate reference system we cannot reproject.
    #[error("{} uses coordinate reference system {crs} which cannot be reprojected: {reason}", path.display())]
    UnsupportedCrs {
        /// Offending file.
        path: PathBuf,
        /// CRS as named in the file.
        crs: String,
        /// Why reprojection failed.
        reason: String,
    },

    /// The dataset is year-partitioned and has no single backing file.
    #[error("Dataset {0} is not backed by a single file")]
    NotFileBacked(DatasetId),
}
