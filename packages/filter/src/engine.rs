//! The filter engine: per-dataset entry points over a shared catalog.

use std::num::NonZeroUsize;
use std::sync::Arc;

use mobility_map_dataset::Catalog;
use mobility_map_dataset_models::{DatasetId, SelectionKey};

use crate::predicate::{filter_collisions, filter_dimensions};
use crate::{FilterCache, FilterKey, FilteredSet};

/// Result of a collision filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Matching rows.
    pub set: FilteredSet,
    /// Selected years whose file could not be read.
    pub failed_years: Vec<i32>,
}

/// Filters the datasets of one [`Catalog`], memoizing every result.
pub struct FilterEngine {
    catalog: Arc<Catalog>,
    cache: FilterCache,
}

impl FilterEngine {
    /// Creates an engine keeping up to `collision_capacity` collision
    /// results.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, collision_capacity: NonZeroUsize) -> Self {
        Self {
            catalog,
            cache: FilterCache::new(collision_capacity),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn cache(&self) -> &FilterCache {
        &self.cache
    }

    /// Filters a single-file dataset. `selections` holds one key per
    /// dimension in [`DatasetId::dimensions`] order; missing trailing keys
    /// count as unselected.
    ///
    /// Collisions are served by [`Self::collisions`]; asking for them here
    /// returns an empty set.
    #[must_use]
    pub fn filter(&self, dataset: DatasetId, selections: &[SelectionKey]) -> Arc<FilteredSet> {
        if dataset == DatasetId::Collisions {
            log::warn!("Collisions must be filtered by year and characteristic");
            return Arc::new(FilteredSet::empty(dataset));
        }

        let dimensions = dataset.dimensions();
        let mut keys: Vec<SelectionKey> = selections.iter().take(dimensions.len()).cloned().collect();
        keys.resize(dimensions.len(), SelectionKey::empty());
        let key = FilterKey::new(dataset, keys);

        if key.is_unselected() {
            return Arc::new(FilteredSet::empty(dataset));
        }

        self.cache.static_result(key.clone(), || {
            let constraints: Vec<(&str, &SelectionKey)> = dimensions
                .iter()
                .zip(&key.selections)
                .filter_map(|(dimension, selection)| {
                    dimension.column().map(|column| (column, selection))
                })
                .collect();
            filter_dimensions(&self.catalog.dataset(dataset), &constraints)
        })
    }

    /// Junctions whose type is in `types`.
    #[must_use]
    pub fn junctions(&self, types: &SelectionKey) -> Arc<FilteredSet> {
        self.filter(DatasetId::Junctions, std::slice::from_ref(types))
    }

    /// Traffic controls whose type is in `types`.
    #[must_use]
    pub fn traffic_controls(&self, types: &SelectionKey) -> Arc<FilteredSet> {
        self.filter(DatasetId::TrafficControls, std::slice::from_ref(types))
    }

    /// Traffic-calming assets whose code is in `codes`.
    #[must_use]
    pub fn traffic_calming(&self, codes: &SelectionKey) -> Arc<FilteredSet> {
        self.filter(DatasetId::TrafficCalming, std::slice::from_ref(codes))
    }

    /// Street lights by use and material; either may be unselected.
    #[must_use]
    pub fn street_lights(&self, uses: &SelectionKey, materials: &SelectionKey) -> Arc<FilteredSet> {
        self.filter(DatasetId::StreetLights, &[uses.clone(), materials.clone()])
    }

    /// Centrelines by length bucket label and street class; either may be
    /// unselected.
    #[must_use]
    pub fn centrelines(&self, buckets: &SelectionKey, classes: &SelectionKey) -> Arc<FilteredSet> {
        self.filter(DatasetId::Centrelines, &[buckets.clone(), classes.clone()])
    }

    /// Collisions in `years` having every characteristic in
    /// `characteristics`.
    #[must_use]
    pub fn collisions(
        &self,
        years: &SelectionKey,
        characteristics: &SelectionKey,
    ) -> Arc<CollisionResult> {
        let key = FilterKey::new(
            DatasetId::Collisions,
            vec![years.clone(), characteristics.clone()],
        );
        if key.is_unselected() {
            return Arc::new(CollisionResult {
                set: FilteredSet::empty(DatasetId::Collisions),
                failed_years: Vec::new(),
            });
        }

        self.cache.collision_result(key, || {
            let (set, failed_years) =
                filter_collisions(self.catalog.collisions(), years, characteristics);
            CollisionResult { set, failed_years }
        })
    }

    /// Row count of `dataset` filtered by one key per dimension.
    #[must_use]
    pub fn count(&self, dataset: DatasetId, selections: &[SelectionKey]) -> usize {
        match dataset {
            DatasetId::Collisions => {
                let empty = SelectionKey::empty();
                let years = selections.first().unwrap_or(&empty);
                let characteristics = selections.get(1).unwrap_or(&empty);
                self.collisions(years, characteristics).set.len()
            }
            _ => self.filter(dataset, selections).len(),
        }
    }
}
