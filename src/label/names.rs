//! Ordered label names with optional defaults.

/// Ordered set of label names, each with an optional default value.
///
/// Insertion order is the order of the label vector handed to the
/// underlying collector. Re-adding a name keeps its position and replaces
/// its default. Empty names are never stored.
///
/// ```rust
/// # use huginn::LabelNames;
/// let names = LabelNames::new()
///     .names(["method", "status"])
///     .name("region", "unknown");
///
/// assert_eq!(names.ordered_names(), vec!["method", "status", "region"]);
/// assert_eq!(names.default_for("region"), Some("unknown"));
/// assert_eq!(names.default_for("method"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelNames {
    entries: Vec<(String, Option<String>)>,
}

impl LabelNames {
    /// Create an empty set of label names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add label names without defaults.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_names(names);
        self
    }

    /// Add a label name with a default value.
    pub fn name(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.insert(name.into(), Some(default.into()));
        self
    }

    /// In-place form of [`names`](Self::names).
    pub fn add_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name.into(), None);
        }
    }

    /// Insert a name, replacing the default of an existing entry.
    pub(crate) fn insert(&mut self, name: String, default: Option<String>) {
        if name.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = default,
            None => self.entries.push((name, default)),
        }
    }

    /// Default value registered for `name`, if any.
    pub fn default_for(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, default)| default.as_deref())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        !name.is_empty() && self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(name, default)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, default)| (name.as_str(), default.as_deref()))
    }

    /// Snapshot of the names in insertion order.
    pub fn ordered_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }
}
