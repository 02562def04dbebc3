//! Keys, entries and the value types stored in a registry.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

mod address;
mod fraction;

pub use address::Address;
pub use fraction::{Fraction, FIXED1};

/// Identity token stored in a registry.
///
/// Every key type reserves one value, [`RegistryKey::NULL`], meaning
/// "no entry". It is used in hints and as the head/tail of an empty list and
/// is never accepted as a real key.
pub trait RegistryKey: Copy + Eq + Hash + fmt::Debug {
    /// The sentinel key.
    const NULL: Self;

    /// Returns `true` for the sentinel key.
    fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl RegistryKey for u64 {
    const NULL: Self = 0;
}

/// A key together with its current value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<K, V> {
    /// Entry key.
    pub key: K,
    /// Entry value.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// A pending insert of `key` or repositioning of an existing `key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<K, V> {
    /// Key being inserted or moved.
    pub key: K,
    /// Value the key will carry afterwards.
    pub new_value: V,
}

impl<K, V> Change<K, V> {
    /// Creates a change.
    pub fn new(key: K, new_value: V) -> Self {
        Self { key, new_value }
    }
}

/// Neighbor keys supplied alongside an insert or update.
///
/// `greater` is the entry that will sit immediately before the new position
/// and `lesser` the one immediately after it; either may be NULL at the ends
/// of the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hints<K> {
    /// Key immediately after the target position.
    pub lesser: K,
    /// Key immediately before the target position.
    pub greater: K,
}

impl<K: RegistryKey> Hints<K> {
    /// Creates a hint pair.
    pub fn new(lesser: K, greater: K) -> Self {
        Self { lesser, greater }
    }

    /// Hints for an empty list.
    pub fn none() -> Self {
        Self::new(K::NULL, K::NULL)
    }

    /// Returns `true` when either hint names `key`.
    pub fn references(&self, key: &K) -> bool {
        self.lesser == *key || self.greater == *key
    }
}

impl<K: RegistryKey> Default for Hints<K> {
    fn default() -> Self {
        Self::none()
    }
}
