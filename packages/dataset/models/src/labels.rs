//! Human-readable names for raw category codes.
//!
//! One table per labelled dimension. Codes missing from a table never
//! fail a lookup: callers either fall back to a synthesized
//! `"Unknown ..."` label or to the raw code itself.

use crate::{Code, Dimension};

/// Junction type codes (`JUNCTION_T`).
pub const JUNCTION_TYPE_LABELS: &[(i64, &str)] = &[
    (0, "Non-Intersection Junction"),
    (1, "Intersection"),
    (2, "Dead End"),
    (3, "Ferry Route Connection"),
    (4, "Outer Boundary Point"),
    (5, "Boulevard"),
];

/// Traffic control type codes (`CONTROL_TY`).
pub const TRAFFIC_CONTROL_TYPE_LABELS: &[(i64, &str)] = &[
    (1, "Intersection"),
    (6, "Signalized Intersection"),
    (7, "RA-5 with Flashing Beacon"),
    (8, "Overhead Flashing Beacon"),
    (9, "RA-5 without Flashing Beacon"),
    (10, "Rectangular Rapid Flashing Beacon"),
    (11, "Roundabout"),
    (12, "Lane Control"),
    (13, "All Way Stop"),
    (14, "Pedestrian Half Signals"),
    (15, "Median Mounted Flashing Beacon"),
];

/// Traffic-calming asset codes (`ASSETCODE`).
pub const TRAFFIC_CALMING_ASSET_CODE_LABELS: &[(&str, &str)] = &[
    ("SPDHMP", "Speed Humps"),
    ("SPDTBL", "Speed Tables"),
    ("RSDINT", "Raised Intersections"),
    ("RSDCRW", "Raised Crosswalks"),
    ("SPDCSH", "Speed Cushions"),
    ("BMPOUT", "Concrete curb variations: Bump-outs"),
    ("CTRMED", "Concrete curb variations: Centre Island Medians"),
    ("CHICAN", "Concrete curb variations: Chicanes"),
    ("BUSPTF", "Bus Platforms"),
    ("BUSBMP", "Bus Stop Bump Outs / Bus Bulb"),
    ("TRFCIR", "Traffic Circle"),
];

/// Street light use codes (`LIGHTUSE`).
pub const LIGHT_USE_LABELS: &[(&str, &str)] = &[
    ("ROW", "ROW Street Light"),
    ("PRIV", "Private Light"),
    ("AREA", "Area Light"),
    ("FLOOD", "Flood Light"),
    ("PARK", "Park Light"),
    ("PARKING", "Parking Lot Light"),
    ("WALKWAY", "Walkway Light"),
    ("BOARDWALK", "Boardwalk Light"),
];

/// Looks up the label for `code` on `dimension`, if that dimension has a
/// label table and the code is in it.
#[must_use]
pub fn label(dimension: Dimension, code: &Code) -> Option<&'static str> {
    match (dimension, code) {
        (Dimension::JunctionType, Code::Int(i)) => int_label(JUNCTION_TYPE_LABELS, *i),
        (Dimension::TrafficControlType, Code::Int(i)) => {
            int_label(TRAFFIC_CONTROL_TYPE_LABELS, *i)
        }
        (Dimension::TrafficCalmingAssetCode, Code::Text(s)) => {
            text_label(TRAFFIC_CALMING_ASSET_CODE_LABELS, s)
        }
        (Dimension::StreetLightUse, Code::Text(s)) => text_label(LIGHT_USE_LABELS, s),
        _ => None,
    }
}

/// Label for `code`, or a synthesized `"Unknown ... {code}"` string.
#[must_use]
pub fn label_or_unknown(dimension: Dimension, code: &Code) -> String {
    label(dimension, code).map_or_else(
        || match dimension {
            Dimension::TrafficCalmingAssetCode => format!("Unknown Asset Code {code}"),
            _ => format!("Unknown Type {code}"),
        },
        str::to_string,
    )
}

/// Label for `code`, or the raw code itself.
#[must_use]
pub fn label_or_code(dimension: Dimension, code: &Code) -> String {
    label(dimension, code).map_or_else(|| code.to_string(), str::to_string)
}

/// The codes listed in the label table of `dimension`, sorted.
///
/// `None` for dimensions whose options come straight from the data.
#[must_use]
pub fn known_codes(dimension: Dimension) -> Option<Vec<Code>> {
    let mut codes: Vec<Code> = match dimension {
        Dimension::JunctionType => JUNCTION_TYPE_LABELS
            .iter()
            .map(|(c, _)| Code::Int(*c))
            .collect(),
        Dimension::TrafficControlType => TRAFFIC_CONTROL_TYPE_LABELS
            .iter()
            .map(|(c, _)| Code::Int(*c))
            .collect(),
        Dimension::TrafficCalmingAssetCode => TRAFFIC_CALMING_ASSET_CODE_LABELS
            .iter()
            .map(|(c, _)| Code::from(*c))
            .collect(),
        _ => return None,
    };
    codes.sort();
    Some(codes)
}

fn int_label(table: &[(i64, &'static str)], code: i64) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, l)| *l)
}

fn text_label(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == code).map(|(_, l)| *l)
}
