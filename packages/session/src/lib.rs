#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state manager for the mobility map.
//!
//! Each session holds two registers per filter dimension: `live`, bound to
//! the form controls, and `committed`, which the map is always drawn from.
//! UI events arrive as [`Message`]s and are applied by the pure [`update`]
//! reducer. Editing a control only touches `live`; submitting copies every
//! `live` register into `committed` in one step; clearing resets both.

pub mod selections;

use mobility_map_dataset_models::{Basemap, Code, Dimension, MapViewport, SelectionSet};
use serde::{Deserialize, Serialize};

pub use selections::Selections;

/// Complete UI state of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Selections bound to the form controls.
    pub live: Selections,
    /// Selections the map was last rendered from.
    pub committed: Selections,
    /// Whether the committed selections are drawn at all.
    pub show_features: bool,
    /// Active background tiles.
    pub basemap: Basemap,
    /// Last reported map centre and zoom.
    pub viewport: MapViewport,
}

impl SessionState {
    /// Initial state: nothing selected, nothing shown, default basemap and
    /// viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `live` differs from what is currently drawn.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.live != self.committed
    }
}

/// A UI event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A form control's checked values changed.
    SelectionChanged {
        /// Control that changed.
        dimension: Dimension,
        /// Its checked values, in checking order.
        values: Vec<Code>,
    },
    /// The form was submitted ("Render").
    Submit,
    /// "Clear Map" was pressed.
    Clear,
    /// The map widget reported a basemap switch, by display or tile name.
    BasemapSelected {
        /// Reported name.
        name: String,
    },
    /// The map widget reported a pan or zoom.
    ViewportChanged {
        /// New centre and zoom.
        viewport: MapViewport,
    },
}

/// Applies `message` to `state`.
pub fn update(state: &mut SessionState, message: Message) {
    match message {
        Message::SelectionChanged { dimension, values } => {
            let selection: SelectionSet = values.into_iter().collect();
            log::debug!("{dimension} selection now has {} values", selection.len());
            state.live.set(dimension, selection);
        }
        Message::Submit => {
            state.committed = state.live.clone();
            state.show_features = true;
        }
        Message::Clear => {
            state.live.clear();
            state.committed.clear();
            state.show_features = false;
            state.basemap = Basemap::default();
        }
        Message::BasemapSelected { name } => {
            let basemap = Basemap::resolve(&name);
            if Basemap::from_name(&name).is_none() {
                log::warn!("Unknown basemap {name:?}; using {}", basemap.display_name());
            }
            state.basemap = basemap;
        }
        Message::ViewportChanged { viewport } => {
            state.viewport = viewport;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_dataset_models::DatasetId;

    fn select(dimension: Dimension, values: &[Code]) -> Message {
        Message::SelectionChanged {
            dimension,
            values: values.to_vec(),
        }
    }

    #[test]
    fn initial_state_is_empty() {
        let state = SessionState::new();
        assert!(state.live.is_empty());
        assert!(state.committed.is_empty());
        assert!(!state.show_features);
        assert_eq!(state.basemap, Basemap::OpenStreetMap);
        assert_eq!(state.viewport, MapViewport::default());
    }

    #[test]
    fn editing_does_not_touch_committed() {
        let mut state = SessionState::new();
        update(&mut state, select(Dimension::JunctionType, &[Code::Int(1)]));
        assert_eq!(state.live.get(Dimension::JunctionType).len(), 1);
        assert!(state.committed.is_empty());
        assert!(!state.show_features);
        assert!(state.has_pending_changes());
    }

    #[test]
    fn submit_copies_every_dimension_at_once() {
        let mut state = SessionState::new();
        update(&mut state, select(Dimension::JunctionType, &[Code::Int(1), Code::Int(2)]));
        update(&mut state, select(Dimension::CollisionYear, &[Code::Int(2021)]));
        update(&mut state, Message::Submit);
        assert_eq!(state.committed, state.live);
        assert!(state.show_features);
        assert!(!state.has_pending_changes());

        update(&mut state, select(Dimension::JunctionType, &[]));
        assert_eq!(state.committed.get(Dimension::JunctionType).len(), 2);
        assert!(state.committed.any_selected(DatasetId::Collisions));
    }

    #[test]
    fn clear_resets_everything_but_the_viewport() {
        let mut state = SessionState::new();
        let viewport = MapViewport {
            lat: 44.7,
            lon: -63.6,
            zoom: 15,
        };
        update(&mut state, select(Dimension::StreetLightUse, &[Code::from("ROW")]));
        update(&mut state, Message::Submit);
        update(
            &mut state,
            Message::BasemapSelected {
                name: "Dark (Dark Matter)".to_string(),
            },
        );
        update(&mut state, Message::ViewportChanged { viewport });
        update(&mut state, Message::Clear);

        assert!(state.live.is_empty());
        assert!(state.committed.is_empty());
        assert!(!state.show_features);
        assert_eq!(state.basemap, Basemap::OpenStreetMap);
        assert_eq!(state.viewport, viewport);
    }

    #[test]
    fn duplicate_values_are_dropped() {
        let mut state = SessionState::new();
        update(
            &mut state,
            select(Dimension::JunctionType, &[Code::Int(2), Code::Int(1), Code::Int(2)]),
        );
        assert_eq!(
            state.live.get(Dimension::JunctionType).values(),
            &[Code::Int(2), Code::Int(1)]
        );
    }

    #[test]
    fn unknown_basemap_falls_back_to_default() {
        let mut state = SessionState::new();
        update(
            &mut state,
            Message::BasemapSelected {
                name: "CartoDB positron".to_string(),
            },
        );
        assert_eq!(state.basemap, Basemap::Positron);
        update(
            &mut state,
            Message::BasemapSelected {
                name: "Stamen Watercolor".to_string(),
            },
        );
        assert_eq!(state.basemap, Basemap::OpenStreetMap);
    }

    #[test]
    fn messages_deserialize_from_tagged_json() {
        let message: Message = serde_json::from_str(
            r#"{ "type": "selection_changed", "dimension": "junction_type", "values": [1, 2] }"#,
        )
        .unwrap();
        assert_eq!(message, select(Dimension::JunctionType, &[Code::Int(1), Code::Int(2)]));

        let message: Message = serde_json::from_str(r#"{ "type": "submit" }"#).unwrap();
        assert_eq!(message, Message::Submit);
    }
}
