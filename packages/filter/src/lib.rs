#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter engine for the mobility map.
//!
//! Every filter is a pure function of a loaded dataset snapshot and a tuple
//! of [`SelectionKey`]s, so results are memoized by value in a
//! [`FilterCache`]. Selecting nothing in every dimension of a dataset
//! yields an empty result rather than the whole dataset.

pub mod cache;
pub mod engine;
pub mod predicate;

use std::sync::Arc;

use mobility_map_dataset::{Feature, FeatureDataset};
use mobility_map_dataset_models::{DatasetId, SelectionKey};

pub use cache::FilterCache;
pub use engine::{CollisionResult, FilterEngine};

/// Identity of one memoized filter call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterKey {
    /// Dataset being filtered.
    pub dataset: DatasetId,
    /// One key per dimension, in [`DatasetId::dimensions`] order.
    pub selections: Vec<SelectionKey>,
}

impl FilterKey {
    #[must_use]
    pub const fn new(dataset: DatasetId, selections: Vec<SelectionKey>) -> Self {
        Self {
            dataset,
            selections,
        }
    }

    /// Whether every dimension is unselected.
    #[must_use]
    pub fn is_unselected(&self) -> bool {
        self.selections.iter().all(SelectionKey::is_empty)
    }
}

/// A subset of a dataset: the shared source plus the indices of the rows
/// that passed the filter, in source order.
#[derive(Debug, Clone)]
pub struct FilteredSet {
    source: Arc<FeatureDataset>,
    rows: Vec<usize>,
}

impl FilteredSet {
    /// The empty subset of dataset `id`.
    #[must_use]
    pub fn empty(id: DatasetId) -> Self {
        Self {
            source: Arc::new(FeatureDataset::empty(id)),
            rows: Vec::new(),
        }
    }

    /// Every row of `source`.
    #[must_use]
    pub fn all(source: Arc<FeatureDataset>) -> Self {
        let rows = (0..source.len()).collect();
        Self { source, rows }
    }

    /// Rows of `source` for which `keep` holds.
    #[must_use]
    pub fn matching(source: Arc<FeatureDataset>, keep: impl Fn(&Feature) -> bool) -> Self {
        let rows = source
            .features()
            .iter()
            .enumerate()
            .filter(|(_, feature)| keep(feature))
            .map(|(i, _)| i)
            .collect();
        Self { source, rows }
    }

    /// Narrows this subset to rows for which `keep` also holds.
    #[must_use]
    pub fn retain(mut self, keep: impl Fn(&Feature) -> bool) -> Self {
        let features = self.source.features();
        self.rows.retain(|&i| keep(&features[i]));
        self
    }

    #[must_use]
    pub fn dataset_id(&self) -> DatasetId {
        self.source.id()
    }

    #[must_use]
    pub const fn source(&self) -> &Arc<FeatureDataset> {
        &self.source
    }

    /// Row indices into [`Self::source`].
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The selected features, in source order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        let features = self.source.features();
        self.rows.iter().map(move |&i| &features[i])
    }
}

impl PartialEq for FilteredSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.features().eq(other.features())
    }
}
