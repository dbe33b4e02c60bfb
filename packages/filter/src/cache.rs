//! Content-addressed memoization of filter results.
//!
//! Static datasets never change after load and have few distinct
//! selections in practice, so their results are kept for the process
//! lifetime. Collision results hold freshly loaded year unions and are
//! kept in a bounded LRU.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use mobility_map_dataset_models::DatasetId;

use crate::engine::CollisionResult;
use crate::{FilterKey, FilteredSet};

/// Default number of collision results kept.
pub const DEFAULT_COLLISION_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

/// Memoized filter results keyed by [`FilterKey`].
pub struct FilterCache {
    static_results: Mutex<BTreeMap<FilterKey, Arc<FilteredSet>>>,
    collision_results: Mutex<LruCache<FilterKey, Arc<CollisionResult>>>,
}

impl FilterCache {
    /// Creates a cache holding at most `collision_capacity` collision
    /// results.
    #[must_use]
    pub fn new(collision_capacity: NonZeroUsize) -> Self {
        Self {
            static_results: Mutex::new(BTreeMap::new()),
            collision_results: Mutex::new(LruCache::new(collision_capacity)),
        }
    }

    /// Returns the cached static result for `key`, computing it with
    /// `compute` on a miss.
    pub fn static_result(
        &self,
        key: FilterKey,
        compute: impl FnOnce() -> FilteredSet,
    ) -> Arc<FilteredSet> {
        debug_assert_ne!(key.dataset, DatasetId::Collisions);
        if let Some(hit) = self
            .static_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            log::debug!("Filter cache hit for {key:?}");
            return Arc::clone(hit);
        }

        log::debug!("Filter cache miss for {key:?}");
        let result = Arc::new(compute());
        self.static_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| Arc::clone(&result));
        result
    }

    /// Returns the cached collision result for `key`, computing it with
    /// `compute` on a miss and evicting the least recently used entry when
    /// full.
    pub fn collision_result(
        &self,
        key: FilterKey,
        compute: impl FnOnce() -> CollisionResult,
    ) -> Arc<CollisionResult> {
        if let Some(hit) = self
            .collision_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            log::debug!("Collision cache hit for {key:?}");
            return Arc::clone(hit);
        }

        log::debug!("Collision cache miss for {key:?}");
        let result = Arc::new(compute());
        self.collision_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, Arc::clone(&result));
        result
    }

    /// Number of cached static results.
    #[must_use]
    pub fn static_len(&self) -> usize {
        self.static_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of cached collision results.
    #[must_use]
    pub fn collision_len(&self) -> usize {
        self.collision_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for FilterCache {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_CAPACITY)
    }
}
