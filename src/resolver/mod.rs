//! Off-chain neighbor resolution.
//!
//! Given a [`Snapshot`] of a registry and one or more pending changes, the
//! resolvers compute the `(lesser, greater)` hints the registry will accept
//! and the snapshot that results from applying the changes. They are pure
//! functions of their inputs and never touch a live registry; the registry
//! re-validates every hint it receives.

mod mirror;
mod snapshot;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{RegistryError, Result};
use crate::types::{Change, Entry, Hints, RegistryKey};

pub use mirror::SnapshotRegistry;
pub use snapshot::Snapshot;

/// Hints for one change together with the simulated post-change snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution<K, V> {
    /// Neighbors of the change's new position.
    pub hints: Hints<K>,
    /// Snapshot after the change.
    pub snapshot: Snapshot<K, V>,
}

impl<K: Copy, V> Resolution<K, V> {
    /// Key that will follow the changed entry.
    pub fn lesser(&self) -> K {
        self.hints.lesser
    }

    /// Key that will precede the changed entry.
    pub fn greater(&self) -> K {
        self.hints.greater
    }
}

/// Hints for a sequence of changes, aligned with the input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchResolution<K, V> {
    /// Lesser hint of each change.
    pub lessers: Vec<K>,
    /// Greater hint of each change.
    pub greaters: Vec<K>,
    /// Snapshot after every change was simulated.
    pub snapshot: Snapshot<K, V>,
}

impl<K: Copy, V> BatchResolution<K, V> {
    /// Hint pairs, aligned with the input order.
    pub fn hints(&self) -> Vec<Hints<K>> {
        self.lessers
            .iter()
            .zip(&self.greaters)
            .map(|(lesser, greater)| Hints {
                lesser: *lesser,
                greater: *greater,
            })
            .collect()
    }
}

/// A mutation whose hints have not been computed yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingMutation<K, V> {
    /// Insert a fresh key.
    Insert {
        /// Key to insert.
        key: K,
        /// Its value.
        value: V,
    },
    /// Reposition an existing key.
    Update(Change<K, V>),
    /// Remove a key. Removals need no hints.
    Remove(K),
}

/// Computes hints for a single change.
#[derive(Clone, Debug, Default)]
pub struct NeighborResolver<C = NaturalOrder> {
    comparator: C,
}

impl<C> NeighborResolver<C> {
    /// Creates a resolver using `comparator`, which must match the
    /// registry's.
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    /// The ordering predicate.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Hints for moving an existing key to `change.new_value`.
    ///
    /// Fails with [`RegistryError::NotFound`] when the snapshot does not hold
    /// the key; fresh keys go through [`NeighborResolver::resolve_insert`].
    pub fn resolve<K, V>(
        &self,
        snapshot: &Snapshot<K, V>,
        change: &Change<K, V>,
    ) -> Result<Resolution<K, V>>
    where
        K: RegistryKey,
        V: Clone,
        C: Comparator<V>,
    {
        self.resolve_owned(snapshot.clone(), change)
    }

    /// Hints for inserting a key the snapshot does not hold yet.
    pub fn resolve_insert<K, V>(
        &self,
        snapshot: &Snapshot<K, V>,
        key: K,
        value: V,
    ) -> Result<Resolution<K, V>>
    where
        K: RegistryKey,
        V: Clone,
        C: Comparator<V>,
    {
        self.insert_owned(snapshot.clone(), key, value)
    }

    /// The snapshot with `key` removed.
    pub fn resolve_removal<K, V>(&self, snapshot: &Snapshot<K, V>, key: K) -> Result<Snapshot<K, V>>
    where
        K: RegistryKey,
        V: Clone,
    {
        let mut working = snapshot.clone();
        let position = working.position(&key).ok_or(RegistryError::NotFound)?;
        working.remove_at(position);
        Ok(working)
    }

    fn resolve_owned<K, V>(
        &self,
        mut working: Snapshot<K, V>,
        change: &Change<K, V>,
    ) -> Result<Resolution<K, V>>
    where
        K: RegistryKey,
        V: Clone,
        C: Comparator<V>,
    {
        let position = working
            .position(&change.key)
            .ok_or(RegistryError::NotFound)?;
        working.remove_at(position);
        Ok(self.place(working, Entry::new(change.key, change.new_value.clone())))
    }

    fn insert_owned<K, V>(
        &self,
        working: Snapshot<K, V>,
        key: K,
        value: V,
    ) -> Result<Resolution<K, V>>
    where
        K: RegistryKey,
        C: Comparator<V>,
    {
        if key.is_null() {
            return Err(RegistryError::InvalidKey);
        }
        if working.contains(&key) {
            return Err(RegistryError::DuplicateKey);
        }
        Ok(self.place(working, Entry::new(key, value)))
    }

    /// Inserts `entry` before the first entry whose value is strictly less,
    /// so equal values already present keep precedence.
    fn place<K, V>(&self, mut working: Snapshot<K, V>, entry: Entry<K, V>) -> Resolution<K, V>
    where
        K: RegistryKey,
        C: Comparator<V>,
    {
        let index = working
            .iter()
            .position(|existing| self.comparator.less(&existing.value, &entry.value))
            .unwrap_or(working.len());
        let greater = match index {
            0 => K::NULL,
            i => working.key_at(i - 1),
        };
        let lesser = working.key_at(index);
        trace!(key = ?entry.key, index, lesser = ?lesser, greater = ?greater, "resolver.place");
        working.insert_at(index, entry);
        Resolution {
            hints: Hints::new(lesser, greater),
            snapshot: working,
        }
    }
}

/// Computes hints for a sequence of changes that will be submitted back to
/// back.
///
/// Change `i` is resolved against the snapshot produced by simulating
/// changes `0..i`, so its hints are valid only if every earlier change is
/// committed first and in order. If any of them is refused, all later hints
/// are invalid and the whole batch has to be resolved again from a fresh
/// snapshot.
#[derive(Clone, Debug, Default)]
pub struct BatchNeighborResolver<C = NaturalOrder> {
    resolver: NeighborResolver<C>,
}

impl<C> BatchNeighborResolver<C> {
    /// Creates a batch resolver using `comparator`.
    pub fn new(comparator: C) -> Self {
        Self {
            resolver: NeighborResolver::new(comparator),
        }
    }

    /// The single-change resolver used for each step.
    pub fn resolver(&self) -> &NeighborResolver<C> {
        &self.resolver
    }

    /// Resolves `changes` in order, threading the simulated snapshot.
    pub fn resolve_all<K, V>(
        &self,
        snapshot: &Snapshot<K, V>,
        changes: &[Change<K, V>],
    ) -> Result<BatchResolution<K, V>>
    where
        K: RegistryKey,
        V: Clone,
        C: Comparator<V>,
    {
        let mut lessers = Vec::with_capacity(changes.len());
        let mut greaters = Vec::with_capacity(changes.len());
        let mut working = snapshot.clone();
        for change in changes {
            let resolution = self.resolver.resolve_owned(working, change)?;
            lessers.push(resolution.hints.lesser);
            greaters.push(resolution.hints.greater);
            working = resolution.snapshot;
        }
        debug!(changes = changes.len(), len = working.len(), "resolver.batch");
        Ok(BatchResolution {
            lessers,
            greaters,
            snapshot: working,
        })
    }

    /// Resolves a mixed sequence of inserts, updates and removals.
    ///
    /// Removals produce NULL hints.
    pub fn resolve_mutations<K, V>(
        &self,
        snapshot: &Snapshot<K, V>,
        pending: &[PendingMutation<K, V>],
    ) -> Result<BatchResolution<K, V>>
    where
        K: RegistryKey,
        V: Clone,
        C: Comparator<V>,
    {
        let mut lessers = Vec::with_capacity(pending.len());
        let mut greaters = Vec::with_capacity(pending.len());
        let mut working = snapshot.clone();
        for mutation in pending {
            let hints = match mutation {
                PendingMutation::Insert { key, value } => {
                    let resolution = self.resolver.insert_owned(working, *key, value.clone())?;
                    working = resolution.snapshot;
                    resolution.hints
                }
                PendingMutation::Update(change) => {
                    let resolution = self.resolver.resolve_owned(working, change)?;
                    working = resolution.snapshot;
                    resolution.hints
                }
                PendingMutation::Remove(key) => {
                    let position = working.position(key).ok_or(RegistryError::NotFound)?;
                    working.remove_at(position);
                    Hints::none()
                }
            };
            lessers.push(hints.lesser);
            greaters.push(hints.greater);
        }
        debug!(mutations = pending.len(), len = working.len(), "resolver.batch");
        Ok(BatchResolution {
            lessers,
            greaters,
            snapshot: working,
        })
    }
}
