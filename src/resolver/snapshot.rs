use serde::{Deserialize, Serialize};

use crate::types::{Entry, RegistryKey};

/// An ordered, caller-owned copy of a registry's contents, largest first.
///
/// A snapshot is a point-in-time mirror: it is never linked to the registry
/// it was read from and may be stale by the time its hints are submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Default for Snapshot<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> Snapshot<K, V> {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps entries that are already in registry order.
    pub fn from_entries(entries: Vec<Entry<K, V>>) -> Self {
        Self { entries }
    }

    /// Entries, largest first.
    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    /// Consumes the snapshot.
    pub fn into_entries(self) -> Vec<Entry<K, V>> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the snapshot holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&Entry<K, V>> {
        self.entries.get(index)
    }

    /// Iterates entries, largest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    pub(crate) fn insert_at(&mut self, index: usize, entry: Entry<K, V>) {
        self.entries.insert(index, entry);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Entry<K, V> {
        self.entries.remove(index)
    }

    pub(crate) fn truncate_front(&mut self, n: usize) -> Vec<Entry<K, V>> {
        self.entries.drain(..n).collect()
    }
}

impl<K: RegistryKey, V> Snapshot<K, V> {
    /// Index of `key`.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == *key)
    }

    /// Returns `true` when `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Value stored for `key`.
    pub fn value_of(&self, key: &K) -> Option<&V> {
        self.entries
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    /// Keys, largest first.
    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key).collect()
    }

    /// First key, NULL when empty.
    pub fn head(&self) -> K {
        self.entries.first().map_or(K::NULL, |entry| entry.key)
    }

    /// Last key, NULL when empty.
    pub fn tail(&self) -> K {
        self.entries.last().map_or(K::NULL, |entry| entry.key)
    }

    /// Key at `index`, NULL when out of range.
    pub fn key_at(&self, index: usize) -> K {
        self.entries.get(index).map_or(K::NULL, |entry| entry.key)
    }
}

impl<K: Clone, V: Clone> Snapshot<K, V> {
    /// Values, largest first.
    pub fn values(&self) -> Vec<V> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }
}

impl<K, V> FromIterator<Entry<K, V>> for Snapshot<K, V> {
    fn from_iter<I: IntoIterator<Item = Entry<K, V>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Snapshot<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| Entry::new(key, value))
            .collect()
    }
}

impl<K, V> From<Vec<Entry<K, V>>> for Snapshot<K, V> {
    fn from(entries: Vec<Entry<K, V>>) -> Self {
        Self::from_entries(entries)
    }
}

impl<'a, K, V> IntoIterator for &'a Snapshot<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = std::slice::Iter<'a, Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
