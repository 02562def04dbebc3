//! The authoritative sorted registry and its median-tracking variant.
//!
//! Entries are kept in descending value order in a doubly-linked list whose
//! links are slot indices. Inserts and updates are O(1) given correct
//! neighbor hints; the registry never searches for a position itself, it
//! only validates the one it was told about and refuses the mutation when
//! the hints are wrong.

mod median;
mod metrics;
mod options;
mod shared;
mod slots;
mod sorted;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resolver::Snapshot;
use crate::types::{Hints, RegistryKey};

pub use median::{MedianSortedRegistry, Relation};
pub use metrics::{default_metrics, CounterMetrics, CounterSnapshot, NoopMetrics, RegistryMetrics};
pub use options::RegistryOptions;
pub use shared::SharedRegistry;
pub use sorted::{Iter, SortedRegistry};

/// A single hinted mutation, as submitted to a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation<K, V> {
    /// Insert a fresh key.
    Insert {
        /// Key to insert.
        key: K,
        /// Its value.
        value: V,
        /// Neighbors of the target position.
        hints: Hints<K>,
    },
    /// Reposition an existing key.
    Update {
        /// Key to move.
        key: K,
        /// Its new value.
        value: V,
        /// Neighbors of the target position.
        hints: Hints<K>,
    },
    /// Remove a key.
    Remove {
        /// Key to remove.
        key: K,
    },
    /// Remove the `count` largest entries.
    PopN {
        /// Number of entries to remove.
        count: usize,
    },
}

/// The mutation and query contract shared by the authoritative registry and
/// its off-chain mirror.
///
/// Both implementations must accept and reject exactly the same mutations
/// and end up with exactly the same contents.
pub trait OrderedRegistry {
    /// Key type.
    type Key: RegistryKey;
    /// Value type.
    type Value: Clone;

    /// Inserts `key` between `greater` and `lesser`.
    fn insert(
        &mut self,
        key: Self::Key,
        value: Self::Value,
        lesser: Self::Key,
        greater: Self::Key,
    ) -> Result<()>;

    /// Moves `key` to `value`, between `greater` and `lesser`.
    fn update(
        &mut self,
        key: Self::Key,
        value: Self::Value,
        lesser: Self::Key,
        greater: Self::Key,
    ) -> Result<()>;

    /// Removes `key`, returning its value.
    fn remove(&mut self, key: Self::Key) -> Result<Self::Value>;

    /// Removes the `n` largest entries and returns their keys, largest first.
    fn pop_n(&mut self, n: usize) -> Result<Vec<Self::Key>>;

    /// Current contents in descending order.
    fn elements(&self) -> Snapshot<Self::Key, Self::Value>;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Returns `true` when no entry is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the largest entry, NULL when empty.
    fn head(&self) -> Self::Key;

    /// Key of the smallest entry, NULL when empty.
    fn tail(&self) -> Self::Key;

    /// Returns `true` when `key` is stored.
    fn contains(&self, key: &Self::Key) -> bool;

    /// Applies one [`Mutation`].
    fn apply(&mut self, mutation: Mutation<Self::Key, Self::Value>) -> Result<()> {
        match mutation {
            Mutation::Insert { key, value, hints } => {
                self.insert(key, value, hints.lesser, hints.greater)
            }
            Mutation::Update { key, value, hints } => {
                self.update(key, value, hints.lesser, hints.greater)
            }
            Mutation::Remove { key } => self.remove(key).map(|_| ()),
            Mutation::PopN { count } => self.pop_n(count).map(|_| ()),
        }
    }
}
