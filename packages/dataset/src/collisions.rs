//! Year-partitioned collision records.
//!
//! Collisions live in one GeoJSON file per year. Years are discovered from
//! file names, loaded lazily on demand, and summed once per process for
//! the form's per-year and per-characteristic counts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use mobility_map_dataset_models::collision::is_flag_set;
use mobility_map_dataset_models::{CollisionCharacteristic, DatasetId};

use crate::loader::read_feature_file;
use crate::registry::{self, SourceConfig};
use crate::{DatasetError, FeatureDataset};

/// Column holding a collision's year.
pub const YEAR_COLUMN: &str = "Year";

/// Column holding a collision's date, used to derive [`YEAR_COLUMN`].
pub const DATE_COLUMN: &str = "ACCIDENT_D";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Process-wide totals over every collision year file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionTotals {
    /// Row count per available year; zero for years that failed to load.
    pub by_year: BTreeMap<i32, u64>,
    /// Rows with each characteristic flag set, across all years.
    pub by_characteristic: BTreeMap<CollisionCharacteristic, u64>,
    /// Years whose file could not be read.
    pub failed_years: Vec<i32>,
}

/// The rows of several collision years concatenated in year order.
#[derive(Debug, Clone, PartialEq)]
pub struct YearUnion {
    /// Concatenated rows.
    pub dataset: FeatureDataset,
    /// Years that contributed rows.
    pub loaded_years: Vec<i32>,
    /// Years that were requested but could not be read.
    pub failed_years: Vec<i32>,
}

/// Discovers and loads per-year collision files.
pub struct CollisionYearIndex {
    directory: PathBuf,
    prefix: String,
    extension: String,
    totals: OnceLock<CollisionTotals>,
}

impl CollisionYearIndex {
    /// Creates an index over `directory` for files named
    /// `{prefix}{year}.{extension}`.
    #[must_use]
    pub fn new(
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            totals: OnceLock::new(),
        }
    }

    /// Creates the index described by the collisions registry entry,
    /// resolved against the data `root`.
    #[must_use]
    pub fn from_registry(root: &Path) -> Self {
        match &registry::definition(DatasetId::Collisions).source {
            SourceConfig::YearPartitioned {
                directory,
                prefix,
                extension,
            } => Self::new(root.join(directory), prefix.as_str(), extension.as_str()),
            SourceConfig::File { path } => {
                log::warn!("Collisions configured as a single file ({path}); no years available");
                Self::new(root.join(path), "", "")
            }
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Years with a file on disk, ascending. Empty when the directory is
    /// absent or unreadable.
    #[must_use]
    pub fn available_years(&self) -> Vec<i32> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!(
                    "No collision directory at {}: {e}",
                    self.directory.display()
                );
                return Vec::new();
            }
        };

        let suffix = format!(".{}", self.extension);
        let mut years: Vec<i32> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let year = name
                    .to_str()?
                    .strip_prefix(self.prefix.as_str())?
                    .strip_suffix(suffix.as_str())?;
                if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                year.parse().ok()
            })
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Path of the file holding `year`.
    #[must_use]
    pub fn year_path(&self, year: i32) -> PathBuf {
        self.directory
            .join(format!("{}{year}.{}", self.prefix, self.extension))
    }

    /// Loads one year's rows, deriving [`YEAR_COLUMN`] from
    /// [`DATE_COLUMN`] when the file lacks it.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is missing or malformed.
    pub fn load_year(&self, year: i32) -> Result<FeatureDataset, DatasetError> {
        let mut dataset = read_feature_file(DatasetId::Collisions, &self.year_path(year))?;
        if !dataset.has_column(YEAR_COLUMN) && dataset.has_column(DATE_COLUMN) {
            derive_year_column(&mut dataset);
        }
        log::debug!("Loaded {} collisions for {year}", dataset.len());
        Ok(dataset)
    }

    /// Loads and concatenates `years` in ascending order, each year once.
    /// Years that fail to load contribute no rows and are reported in
    /// [`YearUnion::failed_years`].
    #[must_use]
    pub fn load_years(&self, years: &[i32]) -> YearUnion {
        let mut years = years.to_vec();
        years.sort_unstable();
        years.dedup();

        let mut parts = Vec::with_capacity(years.len());
        let mut loaded_years = Vec::with_capacity(years.len());
        let mut failed_years = Vec::new();

        for year in years {
            match self.load_year(year) {
                Ok(part) => {
                    parts.push(part);
                    loaded_years.push(year);
                }
                Err(e) => {
                    log::warn!("Skipping collisions for {year}: {e}");
                    failed_years.push(year);
                }
            }
        }

        YearUnion {
            dataset: FeatureDataset::concat(DatasetId::Collisions, parts),
            loaded_years,
            failed_years,
        }
    }

    /// Per-year and per-characteristic totals, computed on first use by
    /// reading every year file once.
    ///
    /// Totals count the raw rows of each file, including rows whose date
    /// cannot be parsed.
    pub fn totals(&self) -> &CollisionTotals {
        self.totals.get_or_init(|| {
            let mut totals = CollisionTotals {
                by_characteristic: CollisionCharacteristic::all()
                    .iter()
                    .map(|c| (*c, 0))
                    .collect(),
                ..CollisionTotals::default()
            };

            for year in self.available_years() {
                match read_feature_file(DatasetId::Collisions, &self.year_path(year)) {
                    Ok(dataset) => {
                        totals.by_year.insert(year, dataset.len() as u64);
                        for characteristic in CollisionCharacteristic::all() {
                            let flagged = dataset
                                .features()
                                .iter()
                                .filter(|f| is_flag_set(f.property(characteristic.column())))
                                .count() as u64;
                            *totals.by_characteristic.entry(*characteristic).or_insert(0) +=
                                flagged;
                        }
                    }
                    Err(e) => {
                        log::warn!("Could not load or process collision file for year {year}: {e}");
                        totals.by_year.insert(year, 0);
                        totals.failed_years.push(year);
                    }
                }
            }

            log::info!(
                "Counted collisions for {} years ({} failed)",
                totals.by_year.len(),
                totals.failed_years.len()
            );
            totals
        })
    }

    /// Row count for `year`; zero when unavailable or unreadable.
    pub fn year_count(&self, year: i32) -> u64 {
        self.totals().by_year.get(&year).copied().unwrap_or(0)
    }

    /// Rows across all years with `characteristic` set.
    pub fn characteristic_total(&self, characteristic: CollisionCharacteristic) -> u64 {
        self.totals()
            .by_characteristic
            .get(&characteristic)
            .copied()
            .unwrap_or(0)
    }
}

/// Fills [`YEAR_COLUMN`] from [`DATE_COLUMN`], dropping rows whose date
/// cannot be parsed.
fn derive_year_column(dataset: &mut FeatureDataset) {
    let before = dataset.len();
    dataset.features_mut().retain_mut(|feature| {
        let Some(year) = feature.property(DATE_COLUMN).and_then(parse_year) else {
            return false;
        };
        feature
            .properties
            .insert(YEAR_COLUMN.to_string(), serde_json::Value::from(year));
        true
    });
    let dropped = before - dataset.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} collisions with an unparseable {DATE_COLUMN}");
    }
    dataset.refresh_columns();
}

/// Extracts the year from a date value: an ISO/RFC 3339 string, one of a
/// few common date layouts, or epoch milliseconds.
#[must_use]
pub fn parse_year(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => {
            let millis = n.as_i64().or_else(|| {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map(|f| f as i64)
            })?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.year())
        }
        serde_json::Value::String(s) => parse_year_str(s.trim()),
        _ => None,
    }
}

fn parse_year_str(s: &str) -> Option<i32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.year());
    }
    let date_part = s.get(..10).unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map(|d| d.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> CollisionYearIndex {
        CollisionYearIndex::from_registry(&Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"))
    }

    #[test]
    fn discovers_years_in_ascending_order() {
        assert_eq!(index().available_years(), vec![2018, 2019, 2020, 2021]);
    }

    #[test]
    fn missing_directory_means_no_years() {
        let index = CollisionYearIndex::new("/definitely/not/here", "collisions_", "geojson");
        assert!(index.available_years().is_empty());
        assert!(index.totals().by_year.is_empty());
        assert_eq!(index.year_count(2021), 0);
    }

    #[test]
    fn non_digit_year_files_are_ignored() {
        let years = index().available_years();
        assert!(years.iter().all(|y| (1900..2100).contains(y)));
    }

    #[test]
    fn year_column_is_derived_from_accident_date() {
        let dataset = index().load_year(2020).unwrap();
        assert!(dataset.has_column(YEAR_COLUMN));
        for feature in dataset.features() {
            assert_eq!(feature.number(YEAR_COLUMN), Some(2020.0));
        }
        // one fixture row has a garbage date
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn failed_years_are_reported_not_fatal() {
        let union = index().load_years(&[2018, 2021]);
        assert_eq!(union.loaded_years, vec![2021]);
        assert_eq!(union.failed_years, vec![2018]);
        assert_eq!(union.dataset.len(), index().load_year(2021).unwrap().len());
    }

    #[test]
    fn totals_include_rows_with_unparseable_dates() {
        let index = index();
        let raw = read_feature_file(DatasetId::Collisions, &index.year_path(2020)).unwrap();
        assert_eq!(index.year_count(2020), raw.len() as u64);
        assert_eq!(index.load_year(2020).unwrap().len(), 3);
    }

    #[test]
    fn repeated_years_are_loaded_once() {
        let index = index();
        let union = index.load_years(&[2020, 2019, 2020]);
        assert_eq!(union.loaded_years, vec![2019, 2020]);
        assert_eq!(
            union.dataset.len(),
            index.load_years(&[2019, 2020]).dataset.len()
        );
    }

    #[test]
    fn union_of_years_is_the_sum_of_each_year() {
        let index = index();
        let both = index.load_years(&[2019, 2020]);
        let a = index.load_year(2019).unwrap();
        let b = index.load_year(2020).unwrap();
        assert_eq!(both.dataset.len(), a.len() + b.len());
    }

    #[test]
    fn totals_count_each_year_and_characteristic_once() {
        let index = index();
        let totals = index.totals();
        assert_eq!(totals.failed_years, vec![2018]);
        assert_eq!(index.year_count(2018), 0);
        assert_eq!(index.year_count(2019), 3);
        assert_eq!(index.year_count(2020), 4);
        assert_eq!(index.year_count(2021), 4);
        assert_eq!(
            index.characteristic_total(CollisionCharacteristic::PedestrianInvolved),
            5
        );
        assert_eq!(index.characteristic_total(CollisionCharacteristic::FatalInjury), 2);
        assert!(std::ptr::eq(index.totals(), totals));
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(parse_year(&json!("2021-03-04")), Some(2021));
        assert_eq!(parse_year(&json!("2021/03/04 00:00:00")), Some(2021));
        assert_eq!(parse_year(&json!("2019-12-31T23:00:00Z")), Some(2019));
        assert_eq!(parse_year(&json!("03/04/2020")), Some(2020));
        assert_eq!(parse_year(&json!(1_609_459_200_000_i64)), Some(2021));
        assert_eq!(parse_year(&json!("not a date")), None);
        assert_eq!(parse_year(&json!(null)), None);
    }
}
