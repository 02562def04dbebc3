//! Hint-validated sorted registries.
//!
//! A [`SortedRegistry`] keeps keyed values in descending order and accepts
//! inserts and updates only together with the keys of the entries that will
//! surround the new position. The registry validates those neighbor hints
//! in constant time instead of searching. Callers compute hints off-line
//! from a [`Snapshot`] with a [`NeighborResolver`], or several at once with
//! a [`BatchNeighborResolver`].
//!
//! [`MedianSortedRegistry`] additionally tracks the median entry, and
//! [`ReportBook`] builds a rate oracle on top of two median registries.

#![warn(missing_docs)]

pub mod comparator;
pub mod config;
pub mod error;
pub mod oracle;
pub mod registry;
pub mod resolver;
pub mod types;

pub use comparator::{Comparator, NaturalOrder};
pub use config::{ConfigError, HintlistConfig};
pub use error::{HintFault, RegistryError, Result};
pub use oracle::ReportBook;
pub use registry::{
    MedianSortedRegistry, Mutation, OrderedRegistry, RegistryOptions, Relation, SharedRegistry,
    SortedRegistry,
};
pub use resolver::{
    BatchNeighborResolver, BatchResolution, NeighborResolver, PendingMutation, Resolution,
    Snapshot, SnapshotRegistry,
};
pub use types::{Address, Change, Entry, Fraction, Hints, RegistryKey, FIXED1};
