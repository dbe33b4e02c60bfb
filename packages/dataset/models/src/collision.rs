//! Boolean collision characteristics and their flag columns.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A yes/no property recorded on every collision row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CollisionCharacteristic {
    NonFatal,
    FatalInjury,
    YoungDriver,
    PedestrianInvolved,
    AggressiveDriving,
    DistractedDriving,
    ImpairedDriving,
    BicycleCollision,
    IntersectionRelated,
}

impl CollisionCharacteristic {
    /// Returns all variants in form order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NonFatal,
            Self::FatalInjury,
            Self::YoungDriver,
            Self::PedestrianInvolved,
            Self::AggressiveDriving,
            Self::DistractedDriving,
            Self::ImpairedDriving,
            Self::BicycleCollision,
            Self::IntersectionRelated,
        ]
    }

    /// The flag column holding this characteristic (truncated to ten
    /// characters by the source export).
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::NonFatal => "NON_FATAL_",
            Self::FatalInjury => "FATAL_INJU",
            Self::YoungDriver => "YOUNG_DEMO",
            Self::PedestrianInvolved => "PEDESTRIAN",
            Self::AggressiveDriving => "AGRESSIVE_",
            Self::DistractedDriving => "DISTRACTED",
            Self::ImpairedDriving => "IMPAIRED_D",
            Self::BicycleCollision => "BICYCLE_CO",
            Self::IntersectionRelated => "INTERSECTI",
        }
    }

    /// Short name listed in a collision tooltip.
    #[must_use]
    pub const fn tooltip_label(self) -> &'static str {
        match self {
            Self::NonFatal => "Non-Fatal",
            Self::FatalInjury => "Fatal/Injury",
            Self::YoungDriver => "Young Driver",
            Self::PedestrianInvolved => "Pedestrian",
            Self::AggressiveDriving => "Aggressive Driving",
            Self::DistractedDriving => "Distracted",
            Self::ImpairedDriving => "Impaired",
            Self::BicycleCollision => "Bicycle",
            Self::IntersectionRelated => "Intersection",
        }
    }

    /// Title-cased key, e.g. `"Pedestrian Involved"`.
    #[must_use]
    pub fn display_label(self) -> String {
        self.as_ref()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whether a flag column value means "yes".
///
/// Missing values count as `"N"`. Any other value is compared, upper-cased,
/// against `"Y"` and `"YES"`.
#[must_use]
pub fn is_flag_set(value: Option<&serde_json::Value>) -> bool {
    let text = match value {
        None | Some(serde_json::Value::Null) => return false,
        Some(serde_json::Value::String(s)) => s.to_uppercase(),
        Some(other) => other.to_string().to_uppercase(),
    };
    text == "Y" || text == "YES"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flags_are_case_insensitive() {
        assert!(is_flag_set(Some(&json!("Y"))));
        assert!(is_flag_set(Some(&json!("y"))));
        assert!(is_flag_set(Some(&json!("Yes"))));
        assert!(!is_flag_set(Some(&json!("n"))));
        assert!(!is_flag_set(Some(&json!("YESS"))));
        assert!(!is_flag_set(Some(&json!(null))));
        assert!(!is_flag_set(None));
    }

    #[test]
    fn padded_flags_are_not_set() {
        assert!(!is_flag_set(Some(&json!(" y "))));
        assert!(!is_flag_set(Some(&json!("YES "))));
    }

    #[test]
    fn display_labels_are_title_cased() {
        assert_eq!(
            CollisionCharacteristic::PedestrianInvolved.display_label(),
            "Pedestrian Involved"
        );
        assert_eq!(CollisionCharacteristic::NonFatal.display_label(), "Non Fatal");
    }

    #[test]
    fn keys_parse() {
        assert_eq!(
            "fatal_injury".parse::<CollisionCharacteristic>().unwrap(),
            CollisionCharacteristic::FatalInjury
        );
        assert!("fatal".parse::<CollisionCharacteristic>().is_err());
    }

    #[test]
    fn columns_are_unique() {
        let mut columns: Vec<&str> = CollisionCharacteristic::all()
            .iter()
            .map(|c| c.column())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), CollisionCharacteristic::all().len());
    }
}
