//! Per-call label accumulator.

use std::collections::HashMap;
use std::fmt::Display;

/// Unordered label name → value pairs gathered for one emission.
///
/// Later writes win. Empty names and `None` values are dropped silently, so
/// instrumentation code never has to guard its inputs. An empty string is a
/// real value and is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: HashMap<String, String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label, chaining.
    pub fn label(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a label if `value` is present, chaining.
    pub fn label_opt<V: Display>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.insert_opt(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.labels.insert(name, value.to_string());
    }

    pub fn insert_opt<V: Display>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Copy every entry of `other` into this set.
    pub fn merge(&mut self, other: LabelSet) {
        for (name, value) in other.labels {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Read-only copy of the current pairs.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.labels.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}
