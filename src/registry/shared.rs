use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{Mutation, OrderedRegistry};
use crate::comparator::Comparator;
use crate::error::Result;
use crate::resolver::{NeighborResolver, Snapshot};
use crate::types::{Change, Hints};

/// A registry owned outside any single caller and mutated through a narrow
/// API.
///
/// Readers take point-in-time snapshots; writers submit hinted mutations
/// that the registry validates against its live state. A snapshot may go
/// stale between the read and the write, in which case the mutation is
/// refused with a retryable error.
pub struct SharedRegistry<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> Clone for SharedRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: OrderedRegistry> SharedRegistry<R> {
    /// Takes ownership of `registry`.
    pub fn new(registry: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Runs `f` against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&*self.inner.lock())
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> Snapshot<R::Key, R::Value> {
        self.inner.lock().elements()
    }

    /// Applies one hinted mutation atomically.
    pub fn submit(&self, mutation: Mutation<R::Key, R::Value>) -> Result<()> {
        self.inner.lock().apply(mutation)
    }

    /// Runs the snapshot, resolve, submit round trip for `change`.
    ///
    /// The key is inserted when the snapshot does not hold it and updated
    /// otherwise. Retryable refusals trigger a fresh snapshot, up to
    /// `max_attempts` attempts in total; the last error is returned when
    /// they are exhausted. On success returns the hints that were accepted.
    pub fn submit_change<C>(
        &self,
        resolver: &NeighborResolver<C>,
        change: &Change<R::Key, R::Value>,
        max_attempts: usize,
    ) -> Result<Hints<R::Key>>
    where
        C: Comparator<R::Value>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let snapshot = self.snapshot();
            let mutation = if snapshot.contains(&change.key) {
                let resolution = resolver.resolve(&snapshot, change)?;
                Mutation::Update {
                    key: change.key,
                    value: change.new_value.clone(),
                    hints: resolution.hints,
                }
            } else {
                let resolution =
                    resolver.resolve_insert(&snapshot, change.key, change.new_value.clone())?;
                Mutation::Insert {
                    key: change.key,
                    value: change.new_value.clone(),
                    hints: resolution.hints,
                }
            };
            let hints = match &mutation {
                Mutation::Insert { hints, .. } | Mutation::Update { hints, .. } => *hints,
                _ => Hints::none(),
            };
            match self.submit(mutation) {
                Ok(()) => return Ok(hints),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    debug!(key = ?change.key, attempt, error = %err, "registry.shared.retry");
                }
                Err(err) => return Err(err),
            }
        }
    }
}
