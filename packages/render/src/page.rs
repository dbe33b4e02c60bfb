//! The map view: basemap tiles, overlays and widget controls built from a
//! session's committed selections.

use std::time::Instant;

use geojson::FeatureCollection;
use mobility_map_dataset_models::{Basemap, DatasetId};
use mobility_map_filter::FilterEngine;
use mobility_map_session::SessionState;
use serde::Serialize;

use crate::layer::{MapLayer, build_layer};
use crate::summary::{PhaseTimings, SummaryReport};

/// One background tile layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    /// Name shown in the layer switcher.
    pub name: &'static str,
    /// Tile provider identifier.
    pub tiles: &'static str,
    /// Only the active basemap is shown.
    pub show: bool,
}

/// One overlay of drawn features.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayer {
    pub name: String,
    pub dataset: DatasetId,
    pub feature_count: usize,
    pub show: bool,
    pub data: FeatureCollection,
}

/// A map widget control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapControl {
    Fullscreen {
        position: &'static str,
        title: &'static str,
        title_cancel: &'static str,
        force_separate_button: bool,
    },
    LayerControl {
        position: &'static str,
    },
}

/// Everything the frontend needs to draw the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// `[lat, lon]`.
    pub center: [f64; 2],
    pub zoom: u8,
    /// Active basemap first.
    pub tile_layers: Vec<TileLayer>,
    pub overlays: Vec<OverlayLayer>,
    pub controls: Vec<MapControl>,
}

impl MapView {
    /// An empty map at the session's viewport with `active` tiles on top.
    #[must_use]
    pub fn base(state: &SessionState) -> Self {
        let active = state.basemap;
        let tile_layers = std::iter::once(active)
            .chain(Basemap::all().iter().copied().filter(|b| *b != active))
            .map(|basemap| TileLayer {
                name: basemap.display_name(),
                tiles: basemap.tiles(),
                show: basemap == active,
            })
            .collect();

        Self {
            center: [state.viewport.lat, state.viewport.lon],
            zoom: state.viewport.zoom,
            tile_layers,
            overlays: Vec::new(),
            controls: vec![
                MapControl::Fullscreen {
                    position: "topleft",
                    title: "Fullscreen",
                    title_cancel: "Exit Fullscreen",
                    force_separate_button: false,
                },
                MapControl::LayerControl {
                    position: "topleft",
                },
            ],
        }
    }
}

/// Result of one page build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub map: MapView,
    pub summary: SummaryReport,
    /// Problems met while filtering, such as unreadable year files.
    pub warnings: Vec<String>,
}

/// Builds the map for `state` using `engine`.
///
/// Nothing is drawn until the session has submitted at least once; after
/// that every dataset with a non-empty committed subset gets one overlay.
#[must_use]
pub fn render_page(state: &SessionState, engine: &FilterEngine) -> RenderedPage {
    let start = Instant::now();
    let mut map = MapView::base(state);
    let map_init = start.elapsed();

    let start = Instant::now();
    let mut warnings = Vec::new();
    let layers: Vec<MapLayer> = if state.show_features {
        DatasetId::all()
            .iter()
            .filter_map(|dataset| {
                let keys = state.committed.keys_for(*dataset);
                if *dataset == DatasetId::Collisions {
                    let result = engine.collisions(&keys[0], &keys[1]);
                    warnings.extend(result.failed_years.iter().map(|year| {
                        format!("Could not load or process collision file for year {year}.")
                    }));
                    build_layer(&result.set, &keys)
                } else {
                    build_layer(&engine.filter(*dataset, &keys), &keys)
                }
            })
            .collect()
    } else {
        Vec::new()
    };
    let filtering = start.elapsed();

    let start = Instant::now();
    let counts: Vec<(DatasetId, usize)> = layers
        .iter()
        .map(|layer| (layer.dataset, layer.feature_count))
        .collect();
    map.overlays = layers
        .into_iter()
        .map(|layer| OverlayLayer {
            data: layer.to_feature_collection(),
            name: layer.name,
            dataset: layer.dataset,
            feature_count: layer.feature_count,
            show: true,
        })
        .collect();
    let map_render = start.elapsed();

    let timings = PhaseTimings {
        data_load: engine.catalog().load_elapsed(),
        map_init,
        filtering,
        map_render,
    };
    log::debug!(
        "Rendered {} overlays in {:.3}s",
        map.overlays.len(),
        (filtering + map_render).as_secs_f64()
    );

    RenderedPage {
        map,
        summary: SummaryReport::new(counts, timings),
        warnings,
    }
}
