//! Rendered-point totals and phase timings shown under the map.

use std::time::Duration;

use mobility_map_dataset_models::DatasetId;
use serde::{Serialize, Serializer};

/// Wall time of each phase of one page build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimings {
    #[serde(serialize_with = "as_secs")]
    pub data_load: Duration,
    #[serde(serialize_with = "as_secs")]
    pub map_init: Duration,
    #[serde(serialize_with = "as_secs")]
    pub filtering: Duration,
    #[serde(serialize_with = "as_secs")]
    pub map_render: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl std::fmt::Display for PhaseTimings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "**Timing:** Data load: {:.3}s | Map init: {:.3}s | Filtering: {:.3}s | Map render: {:.3}s",
            self.data_load.as_secs_f64(),
            self.map_init.as_secs_f64(),
            self.filtering.as_secs_f64(),
            self.map_render.as_secs_f64(),
        )
    }
}

/// Points drawn per dataset plus timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Sum of every per-dataset count.
    pub total: usize,
    /// Non-zero counts, in [`DatasetId::all`] order.
    pub counts: Vec<(DatasetId, usize)>,
    pub timings: PhaseTimings,
}

impl SummaryReport {
    /// Builds a report from per-dataset counts; zero counts are dropped.
    #[must_use]
    pub fn new(counts: impl IntoIterator<Item = (DatasetId, usize)>, timings: PhaseTimings) -> Self {
        let mut counts: Vec<(DatasetId, usize)> =
            counts.into_iter().filter(|(_, n)| *n > 0).collect();
        counts.sort_by_key(|(id, _)| DatasetId::all().iter().position(|d| d == id));
        let total = counts.iter().map(|(_, n)| n).sum();
        Self {
            total,
            counts,
            timings,
        }
    }

    /// Markdown lines: total, one line per dataset, then timings.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(format!("**Total data points rendered:** {}", self.total))
            .chain(
                self.counts
                    .iter()
                    .map(|(id, n)| format!("- {}: {n}", id.display_name())),
            )
            .chain(std::iter::once(self.timings.to_string()))
            .collect()
    }
}

impl std::fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_omitted_and_order_is_fixed() {
        let report = SummaryReport::new(
            [
                (DatasetId::StreetLights, 4),
                (DatasetId::TrafficControls, 0),
                (DatasetId::Junctions, 3),
            ],
            PhaseTimings::default(),
        );
        assert_eq!(report.total, 7);
        assert_eq!(
            report.counts,
            [(DatasetId::Junctions, 3), (DatasetId::StreetLights, 4)]
        );
        let lines = report.lines();
        assert_eq!(lines[0], "**Total data points rendered:** 7");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn timing_line_uses_three_decimals() {
        let timings = PhaseTimings {
            data_load: Duration::from_millis(1500),
            map_init: Duration::from_millis(2),
            filtering: Duration::from_micros(12_400),
            map_render: Duration::ZERO,
        };
        assert_eq!(
            timings.to_string(),
            "**Timing:** Data load: 1.500s | Map init: 0.002s | Filtering: 0.012s | Map render: 0.000s"
        );
    }

    #[test]
    fn timings_serialize_as_seconds() {
        let value = serde_json::to_value(PhaseTimings {
            data_load: Duration::from_millis(250),
            ..PhaseTimings::default()
        })
        .unwrap();
        assert_eq!(value["dataLoad"], serde_json::json!(0.25));
        assert_eq!(value["mapRender"], serde_json::json!(0.0));
    }
}
