//! Map overlay layers built from filtered subsets.

use geo::{Geometry, LineString};
use geojson::{FeatureCollection, JsonObject, JsonValue};
use mobility_map_dataset::Feature;
use mobility_map_dataset::registry::{self, LayerStyle};
use mobility_map_dataset_models::{DatasetId, SelectionKey};
use mobility_map_filter::FilteredSet;
use serde::Serialize;

use crate::tooltip;

/// One drawable shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// A circle marker at a longitude/latitude.
    Marker {
        lon: f64,
        lat: f64,
        tooltip: String,
    },
    /// A polyline through longitude/latitude vertices.
    Polyline {
        path: Vec<[f64; 2]>,
        tooltip: String,
    },
}

/// A named overlay: every shape drawn for one dataset under one
/// combination of filter values.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Deterministic name, see [`layer_name`].
    pub name: String,
    pub dataset: DatasetId,
    pub style: LayerStyle,
    pub shapes: Vec<Shape>,
    /// Number of source features, which for split multi-part lines is
    /// smaller than the number of shapes.
    pub feature_count: usize,
}

impl MapLayer {
    /// GeoJSON form of this layer. Each feature carries its `tooltip`, the
    /// `layer` name and the style fields as properties.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let style = match serde_json::to_value(&self.style) {
            Ok(JsonValue::Object(style)) => style,
            _ => JsonObject::new(),
        };

        let features = self
            .shapes
            .iter()
            .map(|shape| {
                let (geometry, tooltip) = match shape {
                    Shape::Marker { lon, lat, tooltip } => (
                        geojson::Geometry::new(geojson::Value::Point(vec![*lon, *lat])),
                        tooltip,
                    ),
                    Shape::Polyline { path, tooltip } => (
                        geojson::Geometry::new(geojson::Value::LineString(
                            path.iter().map(|p| p.to_vec()).collect(),
                        )),
                        tooltip,
                    ),
                };

                let mut properties = style.clone();
                properties.insert("tooltip".to_string(), JsonValue::from(tooltip.as_str()));
                properties.insert("layer".to_string(), JsonValue::from(self.name.as_str()));

                geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Layer name: the dataset's prefix followed by every selected value of
/// every dimension, in key order, joined with `_`.
#[must_use]
pub fn layer_name(dataset: DatasetId, keys: &[SelectionKey]) -> String {
    std::iter::once(dataset.layer_prefix().to_string())
        .chain(
            keys.iter()
                .flat_map(|key| key.values().iter().map(ToString::to_string)),
        )
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Builds the overlay for `set`, or `None` when the subset is empty.
///
/// Centrelines become polylines, every other dataset circle markers.
#[must_use]
pub fn build_layer(set: &FilteredSet, keys: &[SelectionKey]) -> Option<MapLayer> {
    let dataset = set.dataset_id();
    let name = layer_name(dataset, keys);
    let style = registry::definition(dataset).style.clone();
    match style {
        LayerStyle::Line { .. } => build_line_layer(set, name, style),
        LayerStyle::Point { .. } => build_point_layer(set, name, style, |feature| {
            tooltip::tooltip(dataset, feature)
        }),
    }
}

/// One marker per feature, placed at the feature's point (or centroid).
///
/// Features without an anchor are skipped and not counted; `None` when
/// nothing is left to draw.
#[must_use]
pub fn build_point_layer(
    set: &FilteredSet,
    name: String,
    style: LayerStyle,
    label: impl Fn(&Feature) -> String,
) -> Option<MapLayer> {
    if set.is_empty() {
        return None;
    }

    let shapes: Vec<Shape> = set
        .features()
        .filter_map(|feature| {
            let point = feature.anchor()?;
            Some(Shape::Marker {
                lon: point.x(),
                lat: point.y(),
                tooltip: label(feature),
            })
        })
        .collect();

    let skipped = set.len() - shapes.len();
    if skipped > 0 {
        log::debug!("Skipped {skipped} features without a location in {name}");
    }
    if shapes.is_empty() {
        return None;
    }

    Some(MapLayer {
        name,
        dataset: set.dataset_id(),
        style,
        feature_count: shapes.len(),
        shapes,
    })
}

/// One polyline per line part; multi-part lines are split and every part
/// shares the feature's tooltip. Non-line features are skipped and not
/// counted.
#[must_use]
pub fn build_line_layer(set: &FilteredSet, name: String, style: LayerStyle) -> Option<MapLayer> {
    if set.is_empty() {
        return None;
    }

    let mut shapes = Vec::new();
    let mut drawn = 0usize;
    for feature in set.features() {
        let parts: Vec<&LineString<f64>> = match &feature.geometry {
            Geometry::LineString(line) => vec![line],
            Geometry::MultiLineString(lines) => lines.0.iter().collect(),
            other => {
                log::debug!("Skipping non-line centreline geometry {other:?}");
                continue;
            }
        };
        drawn += 1;
        let tip = tooltip::centreline(feature);
        shapes.extend(parts.into_iter().map(|line| Shape::Polyline {
            path: line.coords().map(|c| [c.x, c.y]).collect(),
            tooltip: tip.clone(),
        }));
    }

    if shapes.is_empty() {
        return None;
    }

    Some(MapLayer {
        name,
        dataset: set.dataset_id(),
        style,
        shapes,
        feature_count: drawn,
    })
}
