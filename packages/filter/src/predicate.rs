//! Pure filter functions over a dataset snapshot.

use std::sync::Arc;

use mobility_map_dataset::collisions::CollisionYearIndex;
use mobility_map_dataset::FeatureDataset;
use mobility_map_dataset_models::collision::is_flag_set;
use mobility_map_dataset_models::{CollisionCharacteristic, Code, DatasetId, SelectionKey};

use crate::FilteredSet;

/// Multi-valued equality filter across independent dimensions.
///
/// Each `(column, key)` pair is one dimension. An empty key imposes no
/// constraint, but when every key is empty the result is empty. Non-empty
/// keys are combined with AND. A non-empty key on a column the dataset
/// lacks yields an empty result.
#[must_use]
pub fn filter_dimensions(
    dataset: &Arc<FeatureDataset>,
    constraints: &[(&str, &SelectionKey)],
) -> FilteredSet {
    let active: Vec<&(&str, &SelectionKey)> =
        constraints.iter().filter(|(_, key)| !key.is_empty()).collect();
    if active.is_empty() {
        return FilteredSet::empty(dataset.id());
    }

    if let Some((column, _)) = active.iter().find(|(column, _)| !dataset.has_column(column)) {
        log::warn!("{} has no {column} column; filter matches nothing", dataset.id());
        return FilteredSet::empty(dataset.id());
    }

    FilteredSet::matching(Arc::clone(dataset), |feature| {
        active
            .iter()
            .all(|(column, key)| key.matches(feature.property(column)))
    })
}

/// Sequential AND of characteristic flags.
///
/// A characteristic whose column is absent is skipped. Stops as soon as
/// the subset becomes empty.
#[must_use]
pub fn filter_characteristics(
    mut set: FilteredSet,
    characteristics: &[CollisionCharacteristic],
) -> FilteredSet {
    for characteristic in characteristics {
        if set.is_empty() {
            break;
        }
        let column = characteristic.column();
        if !set.source().has_column(column) {
            log::warn!("Collisions have no {column} column; ignoring {characteristic}");
            continue;
        }
        set = set.retain(|feature| is_flag_set(feature.property(column)));
    }
    set
}

/// Parses characteristic selection codes, dropping unknown keys.
#[must_use]
pub fn parse_characteristics(key: &SelectionKey) -> Vec<CollisionCharacteristic> {
    key.values()
        .iter()
        .filter_map(|code| {
            let parsed = code.as_text().and_then(|s| s.parse().ok());
            if parsed.is_none() {
                log::warn!("Ignoring unknown collision characteristic {code}");
            }
            parsed
        })
        .collect()
}

/// Parses year selection codes, dropping non-integral values.
///
/// `2020` and `"2020"` name the same year; the result is ascending with
/// each year once.
#[must_use]
pub fn parse_years(key: &SelectionKey) -> Vec<i32> {
    let mut years: Vec<i32> = key
        .values()
        .iter()
        .filter_map(|code| {
            let year = match code {
                Code::Int(i) => i32::try_from(*i).ok(),
                Code::Text(s) => s.trim().parse().ok(),
            };
            if year.is_none() {
                log::warn!("Ignoring invalid collision year {code}");
            }
            year
        })
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Collision filter: the union of the selected years (or of every
/// available year when only characteristics are selected) narrowed by the
/// AND of the selected characteristics.
///
/// Returns the subset and the years that failed to load.
#[must_use]
pub fn filter_collisions(
    index: &CollisionYearIndex,
    years: &SelectionKey,
    characteristics: &SelectionKey,
) -> (FilteredSet, Vec<i32>) {
    let characteristics = parse_characteristics(characteristics);
    let years = if years.is_empty() {
        if characteristics.is_empty() {
            return (FilteredSet::empty(DatasetId::Collisions), Vec::new());
        }
        index.available_years()
    } else {
        parse_years(years)
    };

    let union = index.load_years(&years);
    if union.dataset.is_empty() {
        return (FilteredSet::empty(DatasetId::Collisions), union.failed_years);
    }

    let set = FilteredSet::all(Arc::new(union.dataset));
    (
        filter_characteristics(set, &characteristics),
        union.failed_years,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point};
    use mobility_map_dataset::Feature;
    use serde_json::json;
    use std::path::Path;

    fn point(props: serde_json::Value) -> Feature {
        Feature::new(
            Geometry::Point(Point::new(-63.58, 44.65)),
            props.as_object().cloned().unwrap_or_default(),
        )
    }

    fn junctions(type1: usize, type2: usize, type3: usize) -> Arc<FeatureDataset> {
        let features = std::iter::repeat_n(1, type1)
            .chain(std::iter::repeat_n(2, type2))
            .chain(std::iter::repeat_n(3, type3))
            .map(|t| point(json!({ "JUNCTION_T": t })))
            .collect();
        Arc::new(FeatureDataset::new(DatasetId::Junctions, features))
    }

    fn key(codes: &[i64]) -> SelectionKey {
        codes.iter().map(|c| Code::Int(*c)).collect()
    }

    fn text_key(codes: &[&str]) -> SelectionKey {
        codes.iter().map(|c| Code::from(*c)).collect()
    }

    fn collisions() -> CollisionYearIndex {
        CollisionYearIndex::new(
            Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../dataset/fixtures/traffic_collisions_by_year"),
            "collisions_",
            "geojson",
        )
    }

    #[test]
    fn selecting_two_junction_types_counts_both() {
        let dataset = junctions(120, 40, 25);
        let set = filter_dimensions(&dataset, &[("JUNCTION_T", &key(&[1, 2]))]);
        assert_eq!(set.len(), 160);
        assert!(set
            .features()
            .all(|f| matches!(f.code("JUNCTION_T"), Some(Code::Int(1 | 2)))));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let dataset = junctions(5, 5, 5);
        let set = filter_dimensions(&dataset, &[("JUNCTION_T", &SelectionKey::empty())]);
        assert!(set.is_empty());

        let set = filter_dimensions(
            &dataset,
            &[("JUNCTION_T", &SelectionKey::empty()), ("OTHER", &SelectionKey::empty())],
        );
        assert!(set.is_empty());
    }

    #[test]
    fn selection_order_does_not_matter() {
        let dataset = junctions(3, 4, 5);
        let a: SelectionKey = [Code::Int(3), Code::Int(1)].into_iter().collect();
        let b: SelectionKey = [Code::Int(1), Code::Int(3), Code::Int(1)].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(
            filter_dimensions(&dataset, &[("JUNCTION_T", &a)]),
            filter_dimensions(&dataset, &[("JUNCTION_T", &b)])
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let dataset = junctions(3, 4, 5);
        let first = filter_dimensions(&dataset, &[("JUNCTION_T", &key(&[2]))]);
        let second = filter_dimensions(&dataset, &[("JUNCTION_T", &key(&[2]))]);
        assert_eq!(first.rows(), second.rows());
    }

    #[test]
    fn two_dimensions_combine_with_and() {
        let dataset = Arc::new(FeatureDataset::new(
            DatasetId::StreetLights,
            vec![
                point(json!({ "LIGHTUSE": "ROW", "MAT": "WOOD" })),
                point(json!({ "LIGHTUSE": "ROW", "MAT": "STEEL" })),
                point(json!({ "LIGHTUSE": "PARK", "MAT": "WOOD" })),
            ],
        ));
        let uses = text_key(&["ROW"]);
        let materials = text_key(&["WOOD"]);
        let none = SelectionKey::empty();

        let only_use = filter_dimensions(&dataset, &[("LIGHTUSE", &uses), ("MAT", &none)]);
        assert_eq!(only_use.rows(), &[0, 1]);
        let only_mat = filter_dimensions(&dataset, &[("LIGHTUSE", &none), ("MAT", &materials)]);
        assert_eq!(only_mat.rows(), &[0, 2]);
        let both = filter_dimensions(&dataset, &[("LIGHTUSE", &uses), ("MAT", &materials)]);
        assert_eq!(both.rows(), &[0]);
    }

    #[test]
    fn missing_column_with_selection_matches_nothing() {
        let dataset = junctions(3, 3, 3);
        let set = filter_dimensions(&dataset, &[("ASSETCODE", &text_key(&["SPDHMP"]))]);
        assert!(set.is_empty());
    }

    #[test]
    fn pedestrian_filter_excludes_lowercase_n() {
        let (set, failed) = filter_collisions(
            &collisions(),
            &key(&[2021]),
            &text_key(&["pedestrian_involved"]),
        );
        assert!(failed.is_empty());
        assert_eq!(set.len(), 2);
        for feature in set.features() {
            assert_eq!(feature.number("Year"), Some(2021.0));
            assert!(is_flag_set(feature.property("PEDESTRIAN")));
        }
    }

    #[test]
    fn year_union_has_no_double_counting() {
        let index = collisions();
        let none = SelectionKey::empty();
        let (both, _) = filter_collisions(&index, &key(&[2019, 2020]), &none);
        let (a, _) = filter_collisions(&index, &key(&[2019]), &none);
        let (b, _) = filter_collisions(&index, &key(&[2020]), &none);
        assert_eq!(both.len(), a.len() + b.len());
        let years: Vec<Option<f64>> = both.features().map(|f| f.number("Year")).collect();
        assert_eq!(
            years,
            a.features()
                .chain(b.features())
                .map(|f| f.number("Year"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn characteristic_order_is_commutative() {
        let index = collisions();
        let all_years = SelectionKey::empty();
        let union = index.load_years(&index.available_years()).dataset;
        let source = Arc::new(union);
        let a = filter_characteristics(
            FilteredSet::all(Arc::clone(&source)),
            &[
                CollisionCharacteristic::PedestrianInvolved,
                CollisionCharacteristic::FatalInjury,
            ],
        );
        let b = filter_characteristics(
            FilteredSet::all(source),
            &[
                CollisionCharacteristic::FatalInjury,
                CollisionCharacteristic::PedestrianInvolved,
            ],
        );
        assert_eq!(a.rows(), b.rows());
        assert_eq!(a.len(), 1);

        let (via_key, failed) = filter_collisions(
            &index,
            &all_years,
            &text_key(&["fatal_injury", "pedestrian_involved"]),
        );
        assert_eq!(via_key.len(), 1);
        assert_eq!(failed, vec![2018]);
    }

    #[test]
    fn characteristics_alone_search_every_year() {
        let (set, _) = filter_collisions(
            &collisions(),
            &SelectionKey::empty(),
            &text_key(&["pedestrian_involved"]),
        );
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn nothing_selected_loads_nothing() {
        let (set, failed) =
            filter_collisions(&collisions(), &SelectionKey::empty(), &SelectionKey::empty());
        assert!(set.is_empty());
        assert!(failed.is_empty());
    }

    #[test]
    fn missing_characteristic_column_is_skipped() {
        let source = Arc::new(FeatureDataset::new(
            DatasetId::Collisions,
            vec![point(json!({ "PEDESTRIAN": "Y" })), point(json!({ "PEDESTRIAN": "N" }))],
        ));
        let set = filter_characteristics(
            FilteredSet::all(source),
            &[
                CollisionCharacteristic::BicycleCollision,
                CollisionCharacteristic::PedestrianInvolved,
            ],
        );
        assert_eq!(set.rows(), &[0]);
    }

    #[test]
    fn parses_selection_codes() {
        assert_eq!(
            parse_characteristics(&text_key(&["fatal_injury", "bogus"])),
            vec![CollisionCharacteristic::FatalInjury]
        );
        let years: SelectionKey = [Code::Int(2020), Code::from("2019"), Code::from("x")]
            .into_iter()
            .collect();
        assert_eq!(parse_years(&years), vec![2019, 2020]);
    }

    #[test]
    fn int_and_text_forms_of_a_year_load_it_once() {
        let index = collisions();
        let none = SelectionKey::empty();
        let mixed: SelectionKey = [Code::Int(2020), Code::from("2020")].into_iter().collect();
        assert_eq!(mixed.len(), 2);

        let (both_forms, _) = filter_collisions(&index, &mixed, &none);
        let (single, _) = filter_collisions(&index, &key(&[2020]), &none);
        assert_eq!(both_forms.len(), single.len());
        assert_eq!(parse_years(&mixed), vec![2020]);
    }
}
