//! Ordered field storage with dirty tracking.

use crate::value::{Comparison, Row, Value};

/// The field storage behind every record: column name to value
/// entries in insertion order, plus the keys changed since the last
/// load or save (in first-touch order).
///
/// Column order matters — insert statements bind values in the order
/// fields were added, and batch inserts reuse the first instance's
/// order for every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
    dirty: Vec<String>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the value for a column, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// True when the column is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a field through change tracking.
    ///
    /// A no-op when the new value compares equal to the current one
    /// under `comparison`; otherwise the field is updated (or added)
    /// and the key marked dirty.
    pub fn set(&mut self, key: &str, value: Value, comparison: Comparison) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            if comparison.values_equal(&entry.1, &value) {
                return;
            }
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
        self.mark_dirty(key);
    }

    /// Sets a field without change tracking.
    ///
    /// Used for driver-generated primary-key back-fill after an
    /// insert, which must not queue the key for the next update.
    pub fn put(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Replaces the entire field mapping.
    ///
    /// The dirty set is left untouched: callers use this as the reset
    /// point for freshly loaded rows, where the instance was created
    /// clean a moment earlier.
    pub fn replace(&mut self, row: Row) {
        self.entries = row;
    }

    /// Merges a row through change tracking, one tracked `set` per
    /// entry.
    pub fn merge(&mut self, row: Row, comparison: Comparison) {
        for (key, value) in row {
            self.set(&key, value, comparison);
        }
    }

    /// True when at least one key is dirty.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty keys in first-touch order.
    pub fn changed_keys(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Clears the dirty set, typically after a confirmed update.
    pub fn clear_changes(&mut self) {
        self.dirty.clear();
    }

    /// Clones the fields into a row.
    #[must_use]
    pub fn to_row(&self) -> Row {
        self.entries.clone()
    }

    fn mark_dirty(&mut self, key: &str) {
        if !self.dirty.iter().any(|k| k == key) {
            self.dirty.push(key.to_string());
        }
    }
}

impl FromIterator<(String, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            dirty: Vec::new(),
        }
    }
}
