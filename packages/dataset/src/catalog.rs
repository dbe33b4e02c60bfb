//! The full set of loaded datasets shared by every session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mobility_map_dataset_models::DatasetId;

use crate::progress::ProgressCallback;
use crate::{CollisionYearIndex, DatasetError, DatasetLoader, FeatureDataset};

/// Every required dataset, loaded once at startup, plus the collision
/// year index.
pub struct Catalog {
    datasets: BTreeMap<DatasetId, Arc<FeatureDataset>>,
    collisions: CollisionYearIndex,
    load_elapsed: Duration,
}

impl Catalog {
    /// Loads every required dataset through `loader`.
    ///
    /// # Errors
    ///
    /// Returns the first [`DatasetError`]; a missing required dataset is
    /// fatal.
    pub fn load(
        loader: &DatasetLoader,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, DatasetError> {
        let start = Instant::now();
        let required = DatasetId::required();
        progress.set_total(required.len() as u64);

        let mut datasets = BTreeMap::new();
        for id in required {
            progress.set_message(format!("Loading {}", id.display_name()));
            datasets.insert(*id, loader.load(*id)?);
            progress.inc(1);
        }

        let collisions = CollisionYearIndex::from_registry(loader.root());
        let load_elapsed = start.elapsed();
        progress.finish(format!(
            "Loaded {} datasets in {:.3}s",
            datasets.len(),
            load_elapsed.as_secs_f64()
        ));
        log::info!(
            "Catalog ready from {} in {:.3}s",
            loader.root().display(),
            load_elapsed.as_secs_f64()
        );

        Ok(Self {
            datasets,
            collisions,
            load_elapsed,
        })
    }

    /// Builds a catalog from already loaded parts.
    #[must_use]
    pub fn from_parts(
        datasets: impl IntoIterator<Item = FeatureDataset>,
        collisions: CollisionYearIndex,
    ) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|d| (d.id(), Arc::new(d)))
                .collect(),
            collisions,
            load_elapsed: Duration::ZERO,
        }
    }

    /// The loaded dataset `id`, or a shared empty dataset when it was
    /// never loaded (collisions are always served by
    /// [`Self::collisions`]).
    #[must_use]
    pub fn dataset(&self, id: DatasetId) -> Arc<FeatureDataset> {
        self.datasets
            .get(&id)
            .map_or_else(|| Arc::new(FeatureDataset::empty(id)), Arc::clone)
    }

    #[must_use]
    pub const fn collisions(&self) -> &CollisionYearIndex {
        &self.collisions
    }

    /// Wall time spent in [`Self::load`].
    #[must_use]
    pub const fn load_elapsed(&self) -> Duration {
        self.load_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;
    use std::path::Path;

    #[test]
    fn loads_every_required_dataset() {
        let loader = DatasetLoader::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"));
        let catalog = Catalog::load(&loader, &null_progress()).unwrap();
        for id in DatasetId::required() {
            assert!(!catalog.dataset(*id).is_empty(), "{id} is empty");
        }
        assert_eq!(catalog.collisions().available_years().len(), 4);
    }

    #[test]
    fn missing_data_root_is_fatal() {
        let loader = DatasetLoader::new("/definitely/not/here");
        assert!(Catalog::load(&loader, &null_progress()).is_err());
    }

    #[test]
    fn unloaded_datasets_are_empty() {
        let catalog = Catalog::from_parts(
            Vec::<FeatureDataset>::new(),
            CollisionYearIndex::new("/definitely/not/here", "collisions_", "geojson"),
        );
        assert!(catalog.dataset(DatasetId::Junctions).is_empty());
        assert_eq!(catalog.load_elapsed(), Duration::ZERO);
    }
}
