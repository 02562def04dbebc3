#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::options::RegistryOptions;
use super::slots::{SlotArena, SlotId};
use super::OrderedRegistry;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{HintFault, RegistryError, Result};
use crate::resolver::Snapshot;
use crate::types::{Entry, Hints, RegistryKey};

/// Capacity-bounded list of `(key, value)` entries sorted by descending
/// value.
///
/// Entries with equal values keep insertion order: an entry inserted or
/// updated to a value that ties existing entries is placed after all of
/// them. Every mutation validates its hints against the live list and is
/// all-or-nothing; a refused mutation leaves the registry untouched.
pub struct SortedRegistry<K, V, C = NaturalOrder> {
    slots: SlotArena<K, V>,
    index: FxHashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    options: RegistryOptions,
    comparator: C,
}

impl<K, V, C> SortedRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V> + Default,
{
    /// Creates an empty registry ordered by `C::default()`.
    pub fn new(options: RegistryOptions) -> Self {
        Self::with_comparator(options, C::default())
    }

    /// Builds a registry holding `snapshot`, appended in order.
    ///
    /// Fails with [`RegistryError::HintMismatch`] when the snapshot is not in
    /// descending order under `C`.
    pub fn from_snapshot(snapshot: &Snapshot<K, V>, options: RegistryOptions) -> Result<Self>
    where
        V: Clone,
    {
        let mut registry = Self::new(options);
        registry.extend_from_snapshot(snapshot)?;
        Ok(registry)
    }
}

impl<K, V, C> SortedRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V>,
{
    /// Creates an empty registry ordered by `comparator`.
    pub fn with_comparator(options: RegistryOptions, comparator: C) -> Self {
        Self {
            slots: SlotArena::default(),
            index: FxHashMap::default(),
            head: None,
            tail: None,
            options,
            comparator,
        }
    }

    /// Appends every entry of `snapshot` at the tail.
    pub fn extend_from_snapshot(&mut self, snapshot: &Snapshot<K, V>) -> Result<()>
    where
        V: Clone,
    {
        for entry in snapshot.iter() {
            let tail = self.tail();
            self.insert(entry.key, entry.value.clone(), K::NULL, tail)?;
        }
        Ok(())
    }

    /// Inserts `key` immediately after `greater` and before `lesser`.
    ///
    /// NULL hints stand for the head (`greater`) and tail (`lesser`) of the
    /// list.
    pub fn insert(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        match self.insert_inner(key, value, lesser, greater) {
            Ok(()) => {
                self.options.metrics.inserted();
                debug!(key = ?key, len = self.len(), "registry.insert");
                Ok(())
            }
            Err(err) => Err(self.reject("insert", &key, err)),
        }
    }

    /// Moves an existing `key` to `value`, between `greater` and `lesser`.
    ///
    /// The hints are interpreted against the list with `key` already taken
    /// out.
    pub fn update(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        match self.update_inner(key, value, lesser, greater) {
            Ok(()) => {
                self.options.metrics.updated();
                debug!(key = ?key, "registry.update");
                Ok(())
            }
            Err(err) => Err(self.reject("update", &key, err)),
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: K) -> Result<V> {
        let Some(id) = self.index.remove(&key) else {
            return Err(self.reject("remove", &key, RegistryError::NotFound));
        };
        self.unlink(id);
        let slot = self.slots.release(id);
        self.options.metrics.removed();
        debug!(key = ?key, len = self.len(), "registry.remove");
        Ok(slot.value)
    }

    /// Removes the `n` largest entries, returning their keys largest first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<K>> {
        if n > self.len() {
            let err = RegistryError::InsufficientElements {
                requested: n,
                available: self.len(),
            };
            return Err(self.reject("pop_n", &K::NULL, err));
        }
        let mut popped = Vec::with_capacity(n);
        for _ in 0..n {
            let id = self.head.expect("registry holds fewer entries than indexed");
            self.unlink(id);
            let slot = self.slots.release(id);
            self.index.remove(&slot.key);
            trace!(key = ?slot.key, "registry.pop");
            popped.push(slot.key);
        }
        self.options.metrics.popped(n);
        debug!(count = n, len = self.len(), "registry.pop_n");
        Ok(popped)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.options.capacity
    }

    /// Returns `true` when `key` is stored.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current value of `key`.
    pub fn value_of(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|id| &self.slots.get(*id).value)
    }

    /// Key of the largest entry, NULL when empty.
    pub fn head(&self) -> K {
        self.key_at(self.head)
    }

    /// Key of the smallest entry, NULL when empty.
    pub fn tail(&self) -> K {
        self.key_at(self.tail)
    }

    /// Current neighbors of `key`: the hints that would leave it in place.
    pub fn neighbors(&self, key: &K) -> Option<Hints<K>> {
        let slot = self.slots.get(*self.index.get(key)?);
        Some(Hints::new(self.key_at(slot.next), self.key_at(slot.prev)))
    }

    /// Iterates entries from largest to smallest.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Keys from largest to smallest.
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(key, _)| *key).collect()
    }

    /// Copies the contents into a [`Snapshot`].
    pub fn elements(&self) -> Snapshot<K, V>
    where
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| Entry::new(*key, value.clone()))
            .collect()
    }

    /// The ordering predicate.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// The options the registry was created with.
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    fn insert_inner(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        if key.is_null() {
            return Err(RegistryError::InvalidKey);
        }
        if Hints::new(lesser, greater).references(&key) {
            return Err(RegistryError::hint(HintFault::SelfReference));
        }
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateKey);
        }
        if self.len() >= self.options.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.options.capacity,
            });
        }
        let (prev, next) = self.locate(&value, lesser, greater, None)?;
        let id = self.slots.alloc(key, value);
        self.link(id, prev, next);
        self.index.insert(key, id);
        Ok(())
    }

    fn update_inner(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        let id = *self.index.get(&key).ok_or(RegistryError::NotFound)?;
        if Hints::new(lesser, greater).references(&key) {
            return Err(RegistryError::hint(HintFault::SelfReference));
        }
        let (prev, next) = self.locate(&value, lesser, greater, Some(id))?;
        self.unlink(id);
        self.slots.get_mut(id).value = value;
        self.link(id, prev, next);
        Ok(())
    }

    /// Validates the hinted position for `value` and returns the slots that
    /// will precede and follow it. `excluded` is treated as already unlinked.
    fn locate(
        &self,
        value: &V,
        lesser: K,
        greater: K,
        excluded: Option<SlotId>,
    ) -> Result<(Option<SlotId>, Option<SlotId>)> {
        let greater_id = self.hint_slot(greater, HintFault::UnknownGreater)?;
        let lesser_id = self.hint_slot(lesser, HintFault::UnknownLesser)?;
        let after_greater = match greater_id {
            Some(id) => self.skip(self.slots.get(id).next, excluded),
            None => self.skip(self.head, excluded),
        };
        if after_greater != lesser_id {
            return Err(RegistryError::hint(HintFault::NotAdjacent));
        }
        if let Some(id) = greater_id {
            if self.comparator.less(&self.slots.get(id).value, value) {
                return Err(RegistryError::hint(HintFault::AboveGreater));
            }
        }
        if let Some(id) = lesser_id {
            if !self.comparator.less(&self.slots.get(id).value, value) {
                return Err(RegistryError::hint(HintFault::NotAboveLesser));
            }
        }
        Ok((greater_id, lesser_id))
    }

    fn hint_slot(&self, key: K, fault: HintFault) -> Result<Option<SlotId>> {
        if key.is_null() {
            return Ok(None);
        }
        match self.index.get(&key) {
            Some(id) => Ok(Some(*id)),
            None => Err(RegistryError::hint(fault)),
        }
    }

    fn skip(&self, link: Option<SlotId>, excluded: Option<SlotId>) -> Option<SlotId> {
        match (link, excluded) {
            (Some(id), Some(ex)) if id == ex => self.slots.get(id).next,
            _ => link,
        }
    }

    fn link(&mut self, id: SlotId, prev: Option<SlotId>, next: Option<SlotId>) {
        {
            let slot = self.slots.get_mut(id);
            slot.prev = prev;
            slot.next = next;
        }
        match prev {
            Some(p) => self.slots.get_mut(p).next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(n) => self.slots.get_mut(n).prev = Some(id),
            None => self.tail = Some(id),
        }
    }

    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = {
            let slot = self.slots.get(id);
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots.get_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots.get_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn key_at(&self, id: Option<SlotId>) -> K {
        id.map(|id| self.slots.get(id).key).unwrap_or(K::NULL)
    }

    fn reject(&self, op: &'static str, key: &K, err: RegistryError) -> RegistryError {
        debug!(op, key = ?key, error = %err, "registry.reject");
        self.options.metrics.rejected(&err);
        err
    }
}

impl<K, V, C> Default for SortedRegistry<K, V, C>
where
    K: RegistryKey,
    C: Comparator<V> + Default,
{
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

impl<K, V, C> OrderedRegistry for SortedRegistry<K, V, C>
where
    K: RegistryKey,
    V: Clone,
    C: Comparator<V>,
{
    type Key = K;
    type Value = V;

    fn insert(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        SortedRegistry::insert(self, key, value, lesser, greater)
    }

    fn update(&mut self, key: K, value: V, lesser: K, greater: K) -> Result<()> {
        SortedRegistry::update(self, key, value, lesser, greater)
    }

    fn remove(&mut self, key: K) -> Result<V> {
        SortedRegistry::remove(self, key)
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<K>> {
        SortedRegistry::pop_n(self, n)
    }

    fn elements(&self) -> Snapshot<K, V> {
        SortedRegistry::elements(self)
    }

    fn len(&self) -> usize {
        SortedRegistry::len(self)
    }

    fn head(&self) -> K {
        SortedRegistry::head(self)
    }

    fn tail(&self) -> K {
        SortedRegistry::tail(self)
    }

    fn contains(&self, key: &K) -> bool {
        SortedRegistry::contains(self, key)
    }
}

/// Iterator over a registry's entries, largest first.
pub struct Iter<'a, K, V> {
    slots: &'a SlotArena<K, V>,
    cursor: Option<SlotId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let slot = slots.get(self.cursor?);
        self.cursor = slot.next;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
