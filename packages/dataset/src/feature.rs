//! In-memory features and datasets.

use std::collections::{BTreeMap, BTreeSet};

use geo::{Centroid, Geometry, Point};
use geojson::JsonObject;
use mobility_map_dataset_models::{Code, DatasetId};

/// One row of a dataset: a geometry plus its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry in WGS84 longitude/latitude.
    pub geometry: Geometry<f64>,
    /// Attribute columns.
    pub properties: JsonObject,
}

impl Feature {
    #[must_use]
    pub const fn new(geometry: Geometry<f64>, properties: JsonObject) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Raw attribute value, `None` when the column is absent.
    #[must_use]
    pub fn property(&self, column: &str) -> Option<&serde_json::Value> {
        self.properties.get(column)
    }

    /// Attribute value as a category code.
    #[must_use]
    pub fn code(&self, column: &str) -> Option<Code> {
        self.property(column).and_then(Code::from_json)
    }

    /// Attribute value as display text. Strings are returned verbatim,
    /// other non-null values in their JSON form.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        match self.property(column)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Attribute value as a number.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.property(column).and_then(serde_json::Value::as_f64)
    }

    /// Location used for a point marker: the point itself, or the centroid
    /// of any other geometry.
    #[must_use]
    pub fn anchor(&self) -> Option<Point<f64>> {
        match &self.geometry {
            Geometry::Point(p) => Some(*p),
            other => other.centroid(),
        }
    }
}

/// An immutable collection of features sharing one attribute schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDataset {
    id: DatasetId,
    features: Vec<Feature>,
    columns: BTreeSet<String>,
}

impl FeatureDataset {
    /// Builds a dataset; the column set is the union of every feature's
    /// attribute names.
    #[must_use]
    pub fn new(id: DatasetId, features: Vec<Feature>) -> Self {
        let columns = features
            .iter()
            .flat_map(|f| f.properties.keys().cloned())
            .collect();
        Self {
            id,
            features,
            columns,
        }
    }

    /// An empty dataset with no columns.
    #[must_use]
    pub const fn empty(id: DatasetId) -> Self {
        Self {
            id,
            features: Vec::new(),
            columns: BTreeSet::new(),
        }
    }

    /// Concatenates several datasets of the same kind, in order.
    #[must_use]
    pub fn concat(id: DatasetId, parts: impl IntoIterator<Item = Self>) -> Self {
        let mut features = Vec::new();
        let mut columns = BTreeSet::new();
        for part in parts {
            features.extend(part.features);
            columns.extend(part.columns);
        }
        Self {
            id,
            features,
            columns,
        }
    }

    #[must_use]
    pub const fn id(&self) -> DatasetId {
        self.id
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Whether any feature carries `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    #[must_use]
    pub const fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    /// Number of features per distinct non-null value of `column`.
    #[must_use]
    pub fn value_counts(&self, column: &str) -> BTreeMap<Code, u64> {
        let mut counts = BTreeMap::new();
        for code in self.features.iter().filter_map(|f| f.code(column)) {
            *counts.entry(code).or_insert(0) += 1;
        }
        counts
    }

    /// Mutable access for load-time normalization, which must keep the
    /// column set in sync through [`Self::refresh_columns`].
    pub(crate) fn features_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.features
    }

    pub(crate) fn refresh_columns(&mut self) {
        self.columns = self
            .features
            .iter()
            .flat_map(|f| f.properties.keys().cloned())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(x: f64, y: f64, props: serde_json::Value) -> Feature {
        Feature::new(
            Geometry::Point(Point::new(x, y)),
            props.as_object().cloned().unwrap_or_default(),
        )
    }

    #[test]
    fn columns_are_the_union_of_all_properties() {
        let dataset = FeatureDataset::new(
            DatasetId::Junctions,
            vec![
                point(0.0, 0.0, json!({ "A": 1 })),
                point(1.0, 1.0, json!({ "B": "x" })),
            ],
        );
        assert!(dataset.has_column("A"));
        assert!(dataset.has_column("B"));
        assert!(!dataset.has_column("C"));
    }

    #[test]
    fn value_counts_skip_nulls() {
        let dataset = FeatureDataset::new(
            DatasetId::Junctions,
            vec![
                point(0.0, 0.0, json!({ "T": 1 })),
                point(0.0, 0.0, json!({ "T": 1 })),
                point(0.0, 0.0, json!({ "T": 2 })),
                point(0.0, 0.0, json!({ "T": null })),
            ],
        );
        let counts = dataset.value_counts("T");
        assert_eq!(counts.get(&Code::Int(1)), Some(&2));
        assert_eq!(counts.get(&Code::Int(2)), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn concat_keeps_order() {
        let a = FeatureDataset::new(DatasetId::Collisions, vec![point(0.0, 0.0, json!({ "n": 1 }))]);
        let b = FeatureDataset::new(DatasetId::Collisions, vec![point(1.0, 1.0, json!({ "n": 2 }))]);
        let joined = FeatureDataset::concat(DatasetId::Collisions, [a, b]);
        let ns: Vec<Option<Code>> = joined.features().iter().map(|f| f.code("n")).collect();
        assert_eq!(ns, vec![Some(Code::Int(1)), Some(Code::Int(2))]);
    }

    #[test]
    fn anchor_uses_centroid_for_lines() {
        let line = Feature::new(
            Geometry::LineString(geo::LineString::from(vec![(0.0, 0.0), (2.0, 0.0)])),
            JsonObject::new(),
        );
        assert_eq!(line.anchor(), Some(Point::new(1.0, 0.0)));
    }
}
