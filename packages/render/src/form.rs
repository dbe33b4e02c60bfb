//! The filter form: one multi-select control per dimension.
//!
//! Option lists and counts depend only on the loaded data, so they are
//! computed once into a [`FormTemplate`]; each render then only fills in
//! the session's live selections.

use std::collections::BTreeMap;

use mobility_map_dataset::collisions::CollisionYearIndex;
use mobility_map_dataset::{Catalog, FeatureDataset};
use mobility_map_dataset_models::labels::{self, label_or_code, label_or_unknown};
use mobility_map_dataset_models::{Code, CollisionCharacteristic, Dimension, LengthBucket};
use mobility_map_session::SessionState;
use serde::Serialize;

/// Label of the submit action.
pub const SUBMIT_LABEL: &str = "Render";
/// Label of the clear action.
pub const CLEAR_LABEL: &str = "Clear Map";

/// One selectable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormOption {
    pub value: Code,
    /// Human-readable label including the live count.
    pub label: String,
    pub count: u64,
}

/// One control of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterControl {
    pub dimension: Dimension,
    pub label: &'static str,
    /// Heading background colour.
    pub color: &'static str,
    pub options: Vec<FormOption>,
    /// Checked values, in checking order.
    pub selected: Vec<Code>,
    /// Set when the control cannot be used; shown as an inline warning.
    pub unavailable: Option<String>,
}

/// The whole form as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterForm {
    pub controls: Vec<FilterControl>,
    pub submit_label: &'static str,
    pub clear_label: &'static str,
    /// Non-fatal problems met while counting options.
    pub warnings: Vec<String>,
}

/// Options and counts for every control, independent of any session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTemplate {
    controls: Vec<FilterControl>,
    warnings: Vec<String>,
}

impl FormTemplate {
    /// Counts the options of every control from `catalog`.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let collisions = catalog.collisions();
        let controls = Dimension::all()
            .iter()
            .map(|dimension| {
                let (options, unavailable) = match dimension {
                    Dimension::CollisionYear => year_options(collisions),
                    Dimension::CollisionCharacteristic => (characteristic_options(collisions), None),
                    _ => dataset_options(*dimension, &catalog.dataset(dimension.dataset())),
                };
                if let Some(reason) = &unavailable {
                    log::warn!("{reason}");
                }
                FilterControl {
                    dimension: *dimension,
                    label: dimension.control_label(),
                    color: dimension.control_color(),
                    options,
                    selected: Vec::new(),
                    unavailable,
                }
            })
            .collect();

        let warnings = collisions
            .totals()
            .failed_years
            .iter()
            .map(|year| format!("Could not load or process collision file for year {year}."))
            .collect();

        Self { controls, warnings }
    }

    /// The form for `state`.
    #[must_use]
    pub fn render(&self, state: &SessionState) -> FilterForm {
        let controls = self
            .controls
            .iter()
            .map(|control| {
                let selected = if control.unavailable.is_some() {
                    Vec::new()
                } else {
                    state.live.get(control.dimension).values().to_vec()
                };
                FilterControl {
                    selected,
                    ..control.clone()
                }
            })
            .collect();

        FilterForm {
            controls,
            submit_label: SUBMIT_LABEL,
            clear_label: CLEAR_LABEL,
            warnings: self.warnings.clone(),
        }
    }

    #[must_use]
    pub fn controls(&self) -> &[FilterControl] {
        &self.controls
    }
}

/// Builds the form for `state` straight from `catalog`.
#[must_use]
pub fn build_form(state: &SessionState, catalog: &Catalog) -> FilterForm {
    FormTemplate::from_catalog(catalog).render(state)
}

fn year_options(collisions: &CollisionYearIndex) -> (Vec<FormOption>, Option<String>) {
    let years = collisions.available_years();
    if years.is_empty() {
        return (
            Vec::new(),
            Some(format!(
                "No collision data files found in '{}/'. Year selection is unavailable.",
                collisions
                    .directory()
                    .file_name()
                    .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
            )),
        );
    }

    let options = years
        .into_iter()
        .map(|year| {
            let count = collisions.year_count(year);
            FormOption {
                value: Code::from(year),
                label: format!("{year} ({count})"),
                count,
            }
        })
        .collect();
    (options, None)
}

fn characteristic_options(collisions: &CollisionYearIndex) -> Vec<FormOption> {
    CollisionCharacteristic::all()
        .iter()
        .map(|characteristic| {
            let count = collisions.characteristic_total(*characteristic);
            FormOption {
                value: Code::from(characteristic.to_string()),
                label: format!("{} ({count})", characteristic.display_label()),
                count,
            }
        })
        .collect()
}

fn dataset_options(
    dimension: Dimension,
    dataset: &FeatureDataset,
) -> (Vec<FormOption>, Option<String>) {
    let Some(column) = dimension.column() else {
        return (Vec::new(), None);
    };

    let missing = !dataset.has_column(column);
    let unavailable = match dimension {
        Dimension::TrafficControlType if missing => Some(format!(
            "Column '{column}' not found in traffic controls data. Cannot display multiselect."
        )),
        Dimension::TrafficCalmingAssetCode if missing || dataset.is_empty() => Some(format!(
            "Traffic calming data is not available or '{column}' column is missing."
        )),
        Dimension::StreetLightUse | Dimension::StreetLightMaterial
            if missing || dataset.is_empty() =>
        {
            Some(format!(
                "Street lights data is not available or '{column}' column is missing."
            ))
        }
        Dimension::CentrelineClass if missing => Some(format!(
            "Column '{column}' not found in street centrelines data. Class filter is unavailable."
        )),
        _ => None,
    };
    if unavailable.is_some() {
        return (Vec::new(), unavailable);
    }

    let counts = dataset.value_counts(column);
    let option = |value: Code, label: String| {
        let count = counts.get(&value).copied().unwrap_or(0);
        FormOption {
            label: format!("{label} ({count})"),
            value,
            count,
        }
    };

    let options = match dimension {
        Dimension::JunctionType => labelled_present(dimension, &counts)
            .map(|code| {
                let label = format!("{code}: {}", label_or_unknown(dimension, &code));
                option(code, label)
            })
            .collect(),
        Dimension::TrafficControlType | Dimension::TrafficCalmingAssetCode => {
            labelled_present(dimension, &counts)
                .map(|code| {
                    let label = label_or_unknown(dimension, &code);
                    option(code, label)
                })
                .collect()
        }
        Dimension::StreetLightUse => counts
            .keys()
            .cloned()
            .map(|code| {
                let label = label_or_code(dimension, &code);
                option(code, label)
            })
            .collect(),
        Dimension::CentrelineLength => LengthBucket::all()
            .map(|bucket| Code::from(bucket.label()))
            .filter(|code| counts.contains_key(code))
            .map(|code| {
                let label = code.to_string();
                option(code, label)
            })
            .collect(),
        _ => counts
            .keys()
            .cloned()
            .map(|code| {
                let label = code.to_string();
                option(code, label)
            })
            .collect(),
    };

    (options, None)
}

/// Codes from the label table of `dimension` that occur in the data,
/// sorted.
fn labelled_present<'a>(
    dimension: Dimension,
    counts: &'a BTreeMap<Code, u64>,
) -> impl Iterator<Item = Code> + 'a {
    labels::known_codes(dimension)
        .unwrap_or_default()
        .into_iter()
        .filter(move |code| counts.get(code).copied().unwrap_or(0) > 0)
}
