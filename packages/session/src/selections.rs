//! Per-dimension selection registers.

use std::collections::BTreeMap;

use mobility_map_dataset_models::{DatasetId, Dimension, SelectionKey, SelectionSet};
use serde::{Deserialize, Serialize};

static EMPTY: SelectionSet = SelectionSet::new();

/// One [`SelectionSet`] per filter dimension. Dimensions without an entry
/// are unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections {
    sets: BTreeMap<Dimension, SelectionSet>,
}

impl Selections {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }

    /// The selection for `dimension`.
    #[must_use]
    pub fn get(&self, dimension: Dimension) -> &SelectionSet {
        self.sets.get(&dimension).unwrap_or(&EMPTY)
    }

    /// Replaces the selection for `dimension`.
    pub fn set(&mut self, dimension: Dimension, selection: SelectionSet) {
        if selection.is_empty() {
            self.sets.remove(&dimension);
        } else {
            self.sets.insert(dimension, selection);
        }
    }

    /// Order-independent key for `dimension`.
    #[must_use]
    pub fn key(&self, dimension: Dimension) -> SelectionKey {
        self.get(dimension).key()
    }

    /// Keys for every dimension of `dataset`, in
    /// [`DatasetId::dimensions`] order.
    #[must_use]
    pub fn keys_for(&self, dataset: DatasetId) -> Vec<SelectionKey> {
        dataset.dimensions().iter().map(|d| self.key(*d)).collect()
    }

    /// Whether any dimension of `dataset` has a selection.
    #[must_use]
    pub fn any_selected(&self, dataset: DatasetId) -> bool {
        dataset
            .dimensions()
            .iter()
            .any(|d| !self.get(*d).is_empty())
    }

    /// Whether no dimension has a selection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.values().all(SelectionSet::is_empty)
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}
