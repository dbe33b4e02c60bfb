//! Reading, reprojecting and normalizing dataset files.
//!
//! [`DatasetLoader::load`] is idempotent: the first call for a dataset
//! reads its file, later calls return the same shared
//! [`Arc<FeatureDataset>`] without touching storage again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use geo::{Geodesic, Geometry, Length};
use geojson::{GeoJson, JsonObject};
use mobility_map_dataset_models::{DatasetId, LengthBucket};

use crate::crs::Crs;
use crate::registry::{self, ColumnRules, SourceConfig, UNKNOWN_SENTINEL};
use crate::{DatasetError, Feature, FeatureDataset};

/// Column holding the measured ground length of a centreline, metres.
pub const LENGTH_COLUMN: &str = "length_m";

/// Column holding the length bucket label of a centreline.
pub const LENGTH_BUCKET_COLUMN: &str = "length_bucket";

/// Loads file-backed datasets from a data root and memoizes them.
pub struct DatasetLoader {
    root: PathBuf,
    cache: Mutex<BTreeMap<DatasetId, Arc<FeatureDataset>>>,
}

impl DatasetLoader {
    /// Creates a loader resolving dataset paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads (or returns the already loaded) dataset `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the backing file is missing, malformed
    /// or in an unsupported CRS, or if `id` is year-partitioned.
    pub fn load(&self, id: DatasetId) -> Result<Arc<FeatureDataset>, DatasetError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = cache.get(&id) {
            log::debug!("Dataset {id} served from cache");
            return Ok(Arc::clone(dataset));
        }

        let definition = registry::definition(id);
        let SourceConfig::File { path } = &definition.source else {
            return Err(DatasetError::NotFileBacked(id));
        };

        let path = self.root.join(path);
        let mut dataset = read_feature_file(id, &path)?;
        apply_column_rules(&mut dataset, &definition.columns);
        log::info!(
            "Loaded {} features for {} from {}",
            dataset.len(),
            definition.name,
            path.display()
        );

        let dataset = Arc::new(dataset);
        cache.insert(id, Arc::clone(&dataset));
        Ok(dataset)
    }
}

/// Reads one GeoJSON `FeatureCollection` and reprojects it to WGS84.
///
/// Features without a geometry are skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not a
/// `FeatureCollection`, holds an invalid geometry, or names an
/// unsupported CRS.
pub fn read_feature_file(id: DatasetId, path: &Path) -> Result<FeatureDataset, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson_err = |source| DatasetError::GeoJson {
        path: path.to_path_buf(),
        source,
    };

    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>().map_err(geojson_err)?
    else {
        return Err(DatasetError::NotFeatureCollection {
            path: path.to_path_buf(),
        });
    };

    let unsupported = |crs: String, reason: String| DatasetError::UnsupportedCrs {
        path: path.to_path_buf(),
        crs,
        reason,
    };
    let crs = Crs::from_foreign_members(collection.foreign_members.as_ref())
        .map_err(|crs| unsupported(crs, "no EPSG code".to_string()))?;
    let reprojector = crs
        .reprojector()
        .map_err(|e| unsupported(format!("{crs:?}"), e.to_string()))?;
    if reprojector.is_some() {
        log::debug!("Reprojecting {} from {crs:?} to WGS84", path.display());
    }

    let mut features = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        let mut geometry: Geometry<f64> = geometry.try_into().map_err(geojson_err)?;
        if let Some(reprojector) = &reprojector {
            geometry = reprojector
                .to_wgs84(&geometry)
                .map_err(|e| unsupported(format!("{crs:?}"), e.to_string()))?;
        }
        features.push(Feature::new(
            geometry,
            feature.properties.unwrap_or_default(),
        ));
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} features without geometry in {}",
            path.display()
        );
    }

    Ok(FeatureDataset::new(id, features))
}

/// Applies load-time column normalization in place.
pub fn apply_column_rules(dataset: &mut FeatureDataset, rules: &ColumnRules) {
    if rules.lowercase {
        for feature in dataset.features_mut() {
            feature.properties = std::mem::take(&mut feature.properties)
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect::<JsonObject>();
        }
        dataset.refresh_columns();
    }

    let fill: Vec<&String> = rules
        .unknown_fill
        .iter()
        .filter(|column| dataset.has_column(column))
        .collect();
    if !fill.is_empty() {
        for feature in dataset.features_mut() {
            for column in &fill {
                if is_blank(feature.properties.get(column.as_str())) {
                    feature.properties.insert(
                        (*column).clone(),
                        serde_json::Value::String(UNKNOWN_SENTINEL.to_string()),
                    );
                }
            }
        }
    }

    if rules.measure_length {
        for feature in dataset.features_mut() {
            let length = ground_length_m(&feature.geometry);
            let bucket = LengthBucket::classify(length);
            feature.properties.insert(
                LENGTH_COLUMN.to_string(),
                serde_json::Number::from_f64(length)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            );
            feature.properties.insert(
                LENGTH_BUCKET_COLUMN.to_string(),
                bucket.map_or(serde_json::Value::Null, |b| {
                    serde_json::Value::String(b.label())
                }),
            );
        }
    }

    dataset.refresh_columns();
}

/// Geodesic length of a line geometry on the WGS84 ellipsoid, metres.
/// Non-line geometries measure zero.
#[must_use]
pub fn ground_length_m(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Line(line) => Geodesic.length(line),
        Geometry::LineString(line) => Geodesic.length(line),
        Geometry::MultiLineString(lines) => Geodesic.length(lines),
        _ => 0.0,
    }
}

fn is_blank(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_dataset_models::Code;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    #[test]
    fn load_is_memoized() {
        let loader = DatasetLoader::new(fixtures());
        let first = loader.load(DatasetId::Junctions).unwrap();
        let second = loader.load(DatasetId::Junctions).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn missing_file_is_an_error() {
        let loader = DatasetLoader::new(fixtures().join("does-not-exist"));
        let err = loader.load(DatasetId::Junctions).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }), "{err}");
    }

    #[test]
    fn collisions_are_not_file_backed() {
        let loader = DatasetLoader::new(fixtures());
        assert!(matches!(
            loader.load(DatasetId::Collisions),
            Err(DatasetError::NotFileBacked(DatasetId::Collisions))
        ));
    }

    #[test]
    fn street_light_blanks_become_unknown() {
        let loader = DatasetLoader::new(fixtures());
        let lights = loader.load(DatasetId::StreetLights).unwrap();
        let uses = lights.value_counts("LIGHTUSE");
        assert_eq!(uses.get(&Code::from("UNKN")), Some(&2));
        assert_eq!(uses.values().sum::<u64>(), lights.len() as u64);
        let materials = lights.value_counts("MAT");
        assert_eq!(materials.values().sum::<u64>(), lights.len() as u64);
    }

    #[test]
    fn centrelines_are_lowercased_measured_and_bucketed() {
        let loader = DatasetLoader::new(fixtures());
        let lines = loader.load(DatasetId::Centrelines).unwrap();
        assert!(lines.has_column("st_class"));
        assert!(!lines.has_column("ST_CLASS"));
        for feature in lines.features() {
            let length = feature.number(LENGTH_COLUMN).unwrap();
            let label = feature.text(LENGTH_BUCKET_COLUMN).unwrap();
            let bucket = LengthBucket::from_label(&label).unwrap();
            assert!(bucket.contains(length), "{length} not in {label}");
        }
    }

    #[test]
    fn utm_sources_are_reprojected() {
        let loader = DatasetLoader::new(fixtures());
        let controls = loader.load(DatasetId::TrafficControls).unwrap();
        for feature in controls.features() {
            let point = feature.anchor().unwrap();
            assert!((-64.0..-63.0).contains(&point.x()), "lon {}", point.x());
            assert!((44.0..45.0).contains(&point.y()), "lat {}", point.y());
        }
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let loader = DatasetLoader::new(fixtures());
        let calming = loader.load(DatasetId::TrafficCalming).unwrap();
        assert_eq!(calming.len(), 4);
    }

    #[test]
    fn geodesic_length_of_one_hundredth_degree_of_latitude() {
        let line = Geometry::LineString(geo::LineString::from(vec![
            (-63.59, 44.64),
            (-63.59, 44.65),
        ]));
        let length = ground_length_m(&line);
        assert!((1_100.0..1_115.0).contains(&length), "{length}");
    }

    #[test]
    fn multi_part_lines_sum_their_parts() {
        let part = geo::LineString::from(vec![(-63.59, 44.64), (-63.59, 44.645)]);
        let single = ground_length_m(&Geometry::LineString(part.clone()));
        let double = ground_length_m(&Geometry::MultiLineString(geo::MultiLineString::new(
            vec![part.clone(), part],
        )));
        assert!((double - 2.0 * single).abs() < 1e-6);
    }
}
