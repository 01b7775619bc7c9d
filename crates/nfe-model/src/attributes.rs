//! Named attribute sets produced by the field binder.

use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::{Deserialize, Serialize};

/// Mapping from attribute name to sanitized value.
///
/// Insertion order is kept so serializers can reproduce layout order, but no
/// operation depends on it. An empty string is a present-but-blank value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    values: IndexMap<String, String>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of `name` when present and not blank.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.values.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Field-level union: every attribute of `other` overwrites the same name
    /// here; names absent from `other` are left untouched.
    pub fn merge(&mut self, other: AttributeSet) {
        for (name, value) in other.values {
            self.values.insert(name, value);
        }
    }

    /// Like [`merge`](Self::merge) but only for the listed names.
    pub fn merge_only(&mut self, other: AttributeSet, names: &[&str]) {
        for (name, value) in other.values {
            if names.contains(&name.as_str()) {
                self.values.insert(name, value);
            }
        }
    }

    /// Insert a blank value for each listed name that is not present yet.
    pub fn fill_missing(&mut self, names: &[&str]) {
        for name in names {
            if !self.values.contains_key(*name) {
                self.values.insert((*name).to_string(), String::new());
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for AttributeSet {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_last_writer_wins() {
        let mut slot: AttributeSet = [("CST", "01"), ("vBC", "10.00")].into_iter().collect();
        slot.merge([("vBC", "20.00"), ("pPIS", "1.65")].into_iter().collect());
        assert_eq!(slot.get("CST"), Some("01"));
        assert_eq!(slot.get("vBC"), Some("20.00"));
        assert_eq!(slot.get("pPIS"), Some("1.65"));
    }

    #[test]
    fn merge_only_filters_names() {
        let mut slot = AttributeSet::new();
        slot.merge_only(
            [("CST", "99"), ("vPIS", "3.00")].into_iter().collect(),
            &["CST"],
        );
        assert_eq!(slot.get("CST"), Some("99"));
        assert!(!slot.contains("vPIS"));
    }

    #[test]
    fn fill_missing_keeps_bound_values() {
        let mut slot: AttributeSet = [("CNPJ", "123")].into_iter().collect();
        slot.fill_missing(&["CNPJ", "CPF"]);
        assert_eq!(slot.get("CNPJ"), Some("123"));
        assert_eq!(slot.get("CPF"), Some(""));
        assert_eq!(slot.non_empty("CPF"), None);
    }
}
