use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::options::RegistryOptions;
use super::sorted::SortedRegistry;
use super::OrderedRegistry;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::resolver::Snapshot;
use crate::types::RegistryKey;

/// Position of an entry relative to the median entry.
///
/// Purely positional: two entries with equal values can carry different
/// relations. Discriminants match the encoding used by the report lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Relation {
    /// The key is not stored.
    Undefined = 0,
    /// After the median.
    Lesser = 1,
    /// Before the median.
    Greater = 2,
    /// The median itself.
    Equal = 3,
}

impl Relation {
    /// Numeric encoding.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a numeric relation.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Relation::Undefined),
            1 => Some(Relation::Lesser),
            2 => Some(Relation::Greater),
            3 => Some(Relation::Equal),
            _ => None,
        }
    }
}

/// A [`SortedRegistry`] that also tracks its median entry.
///
/// With entries indexed `0..len` from largest to smallest, the median is the
/// entry at index `(len - 1) / 2`. Every successful mutation recomputes the
/// median and the relation of each entry to it.
pub struct MedianSortedRegistry<K, V, C = NaturalOrder> {
    list: SortedRegistry<K, V, C>,
    relations: FxHashMap<K, Relation>,
    median: K,
}

impl<K, V, C> MedianSortedRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V> + Default,
{
    /// Creates an empty registry ordered by `C::default()`.
    pub fn new(options: RegistryOptions) -> Self {
        Self::with_comparator(options, C::default())
    }

    /// Builds a registry holding `snapshot`, appended in order.
    pub fn from_snapshot(snapshot: &Snapshot<K, V>, options: RegistryOptions) -> Result<Self>
    where
        V: Clone,
    {
        let list = SortedRegistry::from_snapshot(snapshot, options)?;
        Ok(Self::wrap(list))
    }
}

impl<K, V, C> MedianSortedRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V>,
{
    /// Creates an empty registry ordered by `comparator`.
    pub fn with_comparator(options: RegistryOptions, comparator: C) -> Self {
        Self::wrap(SortedRegistry::with_comparator(options, comparator))
    }

    fn wrap(list: SortedRegistry<K, V, C>) -> Self {
        let mut registry = Self {
            list,
            relations: FxHashMap::default(),
            median: K::NULL,
        };
        registry.refresh_median();
        registry
    }

    /// Inserts `key` between `greater` and `lesser`.
    pub fn insert(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        self.list.insert(key, value, lesser, greater)?;
        self.refresh_median();
        Ok(())
    }

    /// Moves `key` to `value`, between `greater` and `lesser`.
    pub fn update(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        self.list.update(key, value, lesser, greater)?;
        self.refresh_median();
        Ok(())
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: K) -> Result<V> {
        let value = self.list.remove(key)?;
        self.refresh_median();
        Ok(value)
    }

    /// Removes the `n` largest entries, returning their keys largest first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<K>> {
        let popped = self.list.pop_n(n)?;
        self.refresh_median();
        Ok(popped)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.list.clear();
        self.refresh_median();
    }

    /// Key of the median entry, NULL when empty.
    pub fn median_key(&self) -> K {
        self.median
    }

    /// Value of the median entry.
    pub fn median_value(&self) -> Option<&V> {
        self.list.value_of(&self.median)
    }

    /// Relation of `key` to the median, [`Relation::Undefined`] if absent.
    pub fn relation_of(&self, key: &K) -> Relation {
        self.relations
            .get(key)
            .copied()
            .unwrap_or(Relation::Undefined)
    }

    /// Number of entries carrying `relation`.
    pub fn count_by_relation(&self, relation: Relation) -> usize {
        self.relations.values().filter(|r| **r == relation).count()
    }

    /// Contents in descending order with each entry's relation, aligned by
    /// index.
    pub fn elements_with_relations(&self) -> (Snapshot<K, V>, Vec<Relation>)
    where
        V: Clone,
    {
        let snapshot = self.list.elements();
        let relations = snapshot
            .iter()
            .map(|entry| self.relation_of(&entry.key))
            .collect();
        (snapshot, relations)
    }

    /// Contents in descending order.
    pub fn elements(&self) -> Snapshot<K, V>
    where
        V: Clone,
    {
        self.list.elements()
    }

    /// The underlying sorted list.
    pub fn list(&self) -> &SortedRegistry<K, V, C> {
        &self.list
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` when no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` when `key` is stored.
    pub fn contains(&self, key: &K) -> bool {
        self.list.contains(key)
    }

    /// Current value of `key`.
    pub fn value_of(&self, key: &K) -> Option<&V> {
        self.list.value_of(key)
    }

    /// Key of the largest entry, NULL when empty.
    pub fn head(&self) -> K {
        self.list.head()
    }

    /// Key of the smallest entry, NULL when empty.
    pub fn tail(&self) -> K {
        self.list.tail()
    }

    fn refresh_median(&mut self) {
        self.relations.clear();
        self.median = K::NULL;
        let len = self.list.len();
        if len == 0 {
            return;
        }
        let median_index = (len - 1) / 2;
        for (index, (key, _)) in self.list.iter().enumerate() {
            let relation = match index.cmp(&median_index) {
                Ordering::Less => Relation::Greater,
                Ordering::Equal => {
                    self.median = *key;
                    Relation::Equal
                }
                Ordering::Greater => Relation::Lesser,
            };
            self.relations.insert(*key, relation);
        }
        trace!(median = ?self.median, len, "registry.median");
    }
}

impl<K, V, C> OrderedRegistry for MedianSortedRegistry<K, V, C>
where
    K: RegistryKey,
    V: Clone,
    C: Comparator<V>,
{
    type Key = K;
    type Value = V;

    fn insert(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        MedianSortedRegistry::insert(self, key, value, lesser, greater)
    }

    fn update(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        MedianSortedRegistry::update(self, key, value, lesser, greater)
    }

    fn remove(&mut self, key: K) -> Result<V> {
        MedianSortedRegistry::remove(self, key)
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<K>> {
        MedianSortedRegistry::pop_n(self, n)
    }

    fn elements(&self) -> Snapshot<K, V> {
        MedianSortedRegistry::elements(self)
    }

    fn len(&self) -> usize {
        MedianSortedRegistry::len(self)
    }

    fn head(&self) -> K {
        MedianSortedRegistry::head(self)
    }

    fn tail(&self) -> K {
        MedianSortedRegistry::tail(self)
    }

    fn contains(&self, key: &K) -> bool {
        MedianSortedRegistry::contains(self, key)
    }
}
