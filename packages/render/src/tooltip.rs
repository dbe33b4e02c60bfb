//! Per-dataset tooltip text.
//!
//! Tooltips are small HTML fragments with `<br>` line breaks. Missing
//! attributes render as `N/A` and unknown category codes fall back to a
//! synthesized label, so building a tooltip never fails.

use mobility_map_dataset::Feature;
use mobility_map_dataset::collisions::{DATE_COLUMN, YEAR_COLUMN};
use mobility_map_dataset::loader::LENGTH_COLUMN;
use mobility_map_dataset_models::collision::is_flag_set;
use mobility_map_dataset_models::labels::{label_or_code, label_or_unknown};
use mobility_map_dataset_models::{CollisionCharacteristic, DatasetId, Dimension};

const MISSING: &str = "N/A";

/// Tooltip for a feature of `dataset`.
#[must_use]
pub fn tooltip(dataset: DatasetId, feature: &Feature) -> String {
    match dataset {
        DatasetId::Junctions => junction(feature),
        DatasetId::TrafficControls => traffic_control(feature),
        DatasetId::Collisions => collision(feature),
        DatasetId::TrafficCalming => traffic_calming(feature),
        DatasetId::StreetLights => street_light(feature),
        DatasetId::Centrelines => centreline(feature),
    }
}

#[must_use]
pub fn junction(feature: &Feature) -> String {
    format!(
        "Junction Type: {}<br>{}",
        unknown_label(feature, Dimension::JunctionType, "JUNCTION_T"),
        lon_lat(feature)
    )
}

#[must_use]
pub fn traffic_control(feature: &Feature) -> String {
    format!(
        "Control Type: {}<br>{}",
        unknown_label(feature, Dimension::TrafficControlType, "CONTROL_TY"),
        lon_lat(feature)
    )
}

#[must_use]
pub fn collision(feature: &Feature) -> String {
    let date: String = text(feature, DATE_COLUMN).chars().take(10).collect();
    let mut out = format!("Year: {}<br>Date: {date}", text(feature, YEAR_COLUMN));

    let present: Vec<&str> = CollisionCharacteristic::all()
        .iter()
        .filter(|c| is_flag_set(feature.property(c.column())))
        .map(|c| c.tooltip_label())
        .collect();
    if !present.is_empty() {
        out.push_str("<br>");
        out.push_str(&present.join(", "));
    }

    out.push_str("<br>");
    out.push_str(&lon_lat(feature));
    out
}

#[must_use]
pub fn traffic_calming(feature: &Feature) -> String {
    let kind = feature.code("ASSETCODE").map_or_else(
        || MISSING.to_string(),
        |code| label_or_code(Dimension::TrafficCalmingAssetCode, &code),
    );
    format!(
        "Type: {kind}<br>Install Year: {}<br>Location: {}<br>{}",
        text(feature, "INSTYR"),
        text(feature, "LOCATION"),
        lon_lat(feature)
    )
}

#[must_use]
pub fn street_light(feature: &Feature) -> String {
    let light_use = feature.code("LIGHTUSE").map_or_else(
        || MISSING.to_string(),
        |code| label_or_code(Dimension::StreetLightUse, &code),
    );
    format!(
        "Material: {}<br>Use: {light_use}<br>Setback: {}<br>Install Year: {}<br>{}",
        text(feature, "MAT"),
        text(feature, "SETBACK"),
        text(feature, "INSTYR"),
        lon_lat(feature)
    )
}

#[must_use]
pub fn centreline(feature: &Feature) -> String {
    format!(
        "Name: {}<br>From: {}<br>To: {}<br>Class: {}<br>Length: {:.1}m",
        text(feature, "full_name"),
        text(feature, "from_str"),
        text(feature, "to_str"),
        text(feature, "st_class"),
        feature.number(LENGTH_COLUMN).unwrap_or(0.0)
    )
}

fn text(feature: &Feature, column: &str) -> String {
    feature
        .text(column)
        .unwrap_or_else(|| MISSING.to_string())
}

fn unknown_label(feature: &Feature, dimension: Dimension, column: &str) -> String {
    feature.code(column).map_or_else(
        || format!("Unknown Type {MISSING}"),
        |code| label_or_unknown(dimension, &code),
    )
}

fn lon_lat(feature: &Feature) -> String {
    feature.anchor().map_or_else(
        || format!("Lon: {MISSING}<br>Lat: {MISSING}"),
        |p| format!("Lon: {:.5}<br>Lat: {:.5}", p.x(), p.y()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, LineString, Point};
    use serde_json::json;

    fn point(props: serde_json::Value) -> Feature {
        Feature::new(
            Geometry::Point(Point::new(-63.5923, 44.6496)),
            props.as_object().cloned().unwrap_or_default(),
        )
    }

    #[test]
    fn junction_tooltip_uses_label_and_coordinates() {
        assert_eq!(
            junction(&point(json!({ "JUNCTION_T": 2 }))),
            "Junction Type: Dead End<br>Lon: -63.59230<br>Lat: 44.64960"
        );
    }

    #[test]
    fn unknown_codes_fall_back_gracefully() {
        assert!(traffic_control(&point(json!({ "CONTROL_TY": 99 })))
            .starts_with("Control Type: Unknown Type 99<br>"));
        assert!(junction(&point(json!({}))).starts_with("Junction Type: Unknown Type N/A<br>"));
        assert!(traffic_calming(&point(json!({ "ASSETCODE": "XYZABC" })))
            .starts_with("Type: XYZABC<br>Install Year: N/A<br>Location: N/A<br>"));
    }

    #[test]
    fn collision_tooltip_lists_present_characteristics() {
        let tip = collision(&point(json!({
            "Year": 2021,
            "ACCIDENT_D": "2021-03-04T00:00:00",
            "PEDESTRIAN": "Y",
            "FATAL_INJU": "yes",
            "BICYCLE_CO": "n",
        })));
        assert_eq!(
            tip,
            "Year: 2021<br>Date: 2021-03-04<br>Fatal/Injury, Pedestrian<br>Lon: -63.59230<br>Lat: 44.64960"
        );
    }

    #[test]
    fn street_light_tooltip_labels_use() {
        let tip = street_light(&point(json!({
            "LIGHTUSE": "PARK",
            "MAT": "STEEL",
            "SETBACK": "UNKN",
            "INSTYR": 2019,
        })));
        assert!(tip.starts_with("Material: STEEL<br>Use: Park Light<br>Setback: UNKN<br>Install Year: 2019<br>"));
    }

    #[test]
    fn centreline_tooltip_rounds_length() {
        let line = Feature::new(
            Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
            json!({ "full_name": "ROBIE ST", "st_class": 5, "length_m": 333.456 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        assert_eq!(
            centreline(&line),
            "Name: ROBIE ST<br>From: N/A<br>To: N/A<br>Class: 5<br>Length: 333.5m"
        );
    }
}
