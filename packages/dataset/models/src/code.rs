//! Raw category codes and the selection containers built from them.
//!
//! A [`SelectionSet`] is what the user has checked in one form control:
//! ordered by the order of checking, never holding a value twice. A
//! [`SelectionKey`] is the same set sorted, which makes equivalent
//! selections compare, hash and name identically.

use serde::{Deserialize, Serialize};

/// A raw attribute value used as a filter option.
///
/// Integer codes sort before text codes; within a kind the natural
/// ordering applies, so `[6, 10]` stays numerically ordered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    /// Integral category code (junction type, control type, year).
    Int(i64),
    /// Text category code (asset code, light use, bucket label).
    Text(String),
}

impl Code {
    /// Interprets a JSON attribute value as a code.
    ///
    /// Integral numbers (including `2.0`) become [`Code::Int`], other
    /// numbers and booleans become their text form. Null, arrays and
    /// objects have no code.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(Self::Int(i));
                }
                match n.as_f64() {
                    #[allow(clippy::cast_possible_truncation)]
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(Self::Int(f as i64)),
                    _ => Some(Self::Text(n.to_string())),
                }
            }
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    /// Whether `value` carries exactly this code.
    #[must_use]
    pub fn matches(&self, value: Option<&serde_json::Value>) -> bool {
        value.and_then(Self::from_json).as_ref() == Some(self)
    }

    /// Returns the integer form, if this is an integral code.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(_) => None,
        }
    }

    /// Returns the text form, if this is a text code.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Code {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Code {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The checked values of one form control, in checking order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Code>", into = "Vec<Code>")]
pub struct SelectionSet {
    values: Vec<Code>,
}

impl SelectionSet {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Adds `code` at the end unless already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, code: Code) -> bool {
        if self.values.contains(&code) {
            return false;
        }
        self.values.push(code);
        true
    }

    /// Removes `code`, returning whether it was present.
    pub fn remove(&mut self, code: &Code) -> bool {
        let before = self.values.len();
        self.values.retain(|c| c != code);
        self.values.len() != before
    }

    /// Replaces the whole selection, dropping repeated values.
    pub fn replace(&mut self, codes: impl IntoIterator<Item = Code>) {
        self.values.clear();
        for code in codes {
            self.insert(code);
        }
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether `code` is selected.
    #[must_use]
    pub fn contains(&self, code: &Code) -> bool {
        self.values.contains(code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// The selected values in checking order.
    #[must_use]
    pub fn values(&self) -> &[Code] {
        &self.values
    }

    /// The order-independent key for this selection.
    #[must_use]
    pub fn key(&self) -> SelectionKey {
        self.values.iter().cloned().collect()
    }
}

impl FromIterator<Code> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = Code>>(iter: T) -> Self {
        let mut set = Self::new();
        set.replace(iter);
        set
    }
}

impl From<Vec<Code>> for SelectionSet {
    fn from(values: Vec<Code>) -> Self {
        values.into_iter().collect()
    }
}

impl From<SelectionSet> for Vec<Code> {
    fn from(set: SelectionSet) -> Self {
        set.values
    }
}

/// A sorted, duplicate-free selection: the cache and layer-name identity
/// of a [`SelectionSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SelectionKey {
    values: Vec<Code>,
}

impl SelectionKey {
    /// The empty key (no constraint selected).
    #[must_use]
    pub const fn empty() -> Self {
        Self { values: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether `code` is part of the key.
    #[must_use]
    pub fn contains(&self, code: &Code) -> bool {
        self.values.binary_search(code).is_ok()
    }

    /// Whether the JSON attribute `value` is one of the selected codes.
    #[must_use]
    pub fn matches(&self, value: Option<&serde_json::Value>) -> bool {
        value
            .and_then(Code::from_json)
            .is_some_and(|code| self.contains(&code))
    }

    /// The selected values in sorted order.
    #[must_use]
    pub fn values(&self) -> &[Code] {
        &self.values
    }
}

impl FromIterator<Code> for SelectionKey {
    fn from_iter<T: IntoIterator<Item = Code>>(iter: T) -> Self {
        let mut values: Vec<Code> = iter.into_iter().collect();
        values.sort();
        values.dedup();
        Self { values }
    }
}

impl<'de> Deserialize<'de> for SelectionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Code>::deserialize(deserializer).map(|values| values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_numbers_become_int_codes() {
        assert_eq!(Code::from_json(&json!(6)), Some(Code::Int(6)));
        assert_eq!(Code::from_json(&json!(6.0)), Some(Code::Int(6)));
        assert_eq!(Code::from_json(&json!(2.5)), Some(Code::Text("2.5".into())));
        assert_eq!(Code::from_json(&json!("ROW")), Some(Code::from("ROW")));
        assert_eq!(Code::from_json(&json!(null)), None);
    }

    #[test]
    fn int_and_text_codes_do_not_match_each_other() {
        assert!(Code::Int(1).matches(Some(&json!(1))));
        assert!(!Code::Int(1).matches(Some(&json!("1"))));
        assert!(!Code::from("1").matches(Some(&json!(1))));
        assert!(!Code::Int(1).matches(None));
    }

    #[test]
    fn selection_set_keeps_checking_order_without_duplicates() {
        let mut set = SelectionSet::new();
        assert!(set.insert(Code::Int(10)));
        assert!(set.insert(Code::Int(6)));
        assert!(!set.insert(Code::Int(10)));
        assert_eq!(set.values(), &[Code::Int(10), Code::Int(6)]);
        assert!(set.remove(&Code::Int(10)));
        assert!(!set.remove(&Code::Int(10)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn keys_ignore_order_and_repeats() {
        let a: SelectionSet = vec![Code::Int(10), Code::Int(6), Code::Int(10)].into();
        let b: SelectionSet = vec![Code::Int(6), Code::Int(10)].into();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().values(), &[Code::Int(6), Code::Int(10)]);
    }

    #[test]
    fn key_deserialization_sorts() {
        let key: SelectionKey = serde_json::from_value(json!(["b", "a", "b"])).unwrap();
        assert_eq!(key.values(), &[Code::from("a"), Code::from("b")]);
        assert!(key.matches(Some(&json!("a"))));
        assert!(!key.matches(Some(&json!("c"))));
    }

    #[test]
    fn set_deserialization_drops_duplicates() {
        let set: SelectionSet = serde_json::from_value(json!([2019, 2020, 2019])).unwrap();
        assert_eq!(set.values(), &[Code::Int(2019), Code::Int(2020)]);
    }
}
