use tracing::debug;

use super::Snapshot;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{HintFault, RegistryError, Result};
use crate::registry::OrderedRegistry;
use crate::types::{Entry, Hints, RegistryKey};

/// A vector-backed registry that validates hints by scanning.
///
/// Accepts and refuses exactly the mutations [`crate::registry::SortedRegistry`]
/// does, in linear time and without any linked structure. Useful as an
/// executable model of the authoritative registry and as a local simulator
/// that can replay a batch of hinted mutations before they are submitted.
#[derive(Clone, Debug)]
pub struct SnapshotRegistry<K, V, C = NaturalOrder> {
    snapshot: Snapshot<K, V>,
    comparator: C,
    capacity: usize,
}

impl<K, V, C> SnapshotRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V>,
{
    /// Mirrors `snapshot`, trusting it to be in registry order.
    pub fn new(snapshot: Snapshot<K, V>, comparator: C, capacity: usize) -> Self {
        Self {
            snapshot,
            comparator,
            capacity,
        }
    }

    /// An empty, unbounded mirror.
    pub fn empty(comparator: C) -> Self {
        Self::new(Snapshot::new(), comparator, usize::MAX)
    }

    /// The mirrored contents.
    pub fn snapshot(&self) -> &Snapshot<K, V> {
        &self.snapshot
    }

    /// Consumes the mirror.
    pub fn into_snapshot(self) -> Snapshot<K, V> {
        self.snapshot
    }

    /// Index the hinted position would take in the list without `excluded`.
    fn locate(&self, value: &V, lesser: K, greater: K, excluded: Option<usize>) -> Result<usize> {
        let view: Vec<&Entry<K, V>> = self
            .snapshot
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != excluded)
            .map(|(_, entry)| entry)
            .collect();
        let find = |key: K, fault: HintFault| -> Result<Option<usize>> {
            if key.is_null() {
                return Ok(None);
            }
            view.iter()
                .position(|entry| entry.key == key)
                .map(Some)
                .ok_or(RegistryError::hint(fault))
        };
        let greater_at = find(greater, HintFault::UnknownGreater)?;
        let lesser_at = find(lesser, HintFault::UnknownLesser)?;
        let target = greater_at.map_or(0, |index| index + 1);
        let expected_lesser = if target < view.len() {
            Some(target)
        } else {
            None
        };
        if lesser_at != expected_lesser {
            return Err(RegistryError::hint(HintFault::NotAdjacent));
        }
        if let Some(index) = greater_at {
            if self.comparator.less(&view[index].value, value) {
                return Err(RegistryError::hint(HintFault::AboveGreater));
            }
        }
        if let Some(index) = lesser_at {
            if !self.comparator.less(&view[index].value, value) {
                return Err(RegistryError::hint(HintFault::NotAboveLesser));
            }
        }
        Ok(target)
    }
}

impl<K, V, C> OrderedRegistry for SnapshotRegistry<K, V, C>
where
    K: RegistryKey,
    V: Clone,
    C: Comparator<V>,
{
    type Key = K;
    type Value = V;

    fn insert(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        if key.is_null() {
            return Err(RegistryError::InvalidKey);
        }
        if Hints::new(lesser, greater).references(&key) {
            return Err(RegistryError::hint(HintFault::SelfReference));
        }
        if self.snapshot.contains(&key) {
            return Err(RegistryError::DuplicateKey);
        }
        if self.snapshot.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let index = self.locate(&value, lesser, greater, None)?;
        self.snapshot.insert_at(index, Entry::new(key, value));
        debug!(key = ?key, index, "mirror.insert");
        Ok(())
    }

    fn update(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        let current = self.snapshot.position(&key).ok_or(RegistryError::NotFound)?;
        if Hints::new(lesser, greater).references(&key) {
            return Err(RegistryError::hint(HintFault::SelfReference));
        }
        let index = self.locate(&value, lesser, greater, Some(current))?;
        self.snapshot.remove_at(current);
        self.snapshot.insert_at(index, Entry::new(key, value));
        debug!(key = ?key, index, "mirror.update");
        Ok(())
    }

    fn remove(&mut self, key: K) -> Result<V> {
        let index = self.snapshot.position(&key).ok_or(RegistryError::NotFound)?;
        Ok(self.snapshot.remove_at(index).value)
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<K>> {
        if n > self.snapshot.len() {
            return Err(RegistryError::InsufficientElements {
                requested: n,
                available: self.snapshot.len(),
            });
        }
        Ok(self
            .snapshot
            .truncate_front(n)
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }

    fn elements(&self) -> Snapshot<K, V> {
        self.snapshot.clone()
    }

    fn len(&self) -> usize {
        self.snapshot.len()
    }

    fn head(&self) -> K {
        self.snapshot.head()
    }

    fn tail(&self) -> K {
        self.snapshot.tail()
    }

    fn contains(&self, key: &K) -> bool {
        self.snapshot.contains(key)
    }
}
