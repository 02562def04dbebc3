use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::RegistryError;

/// Hooks invoked by registries after each mutation attempt.
///
/// Implementations can feed counters into whatever monitoring the embedding
/// service uses. Rejections are reported before the error is returned, so a
/// rising hint-rejection rate is the signal that callers work from stale
/// snapshots.
pub trait RegistryMetrics: Send + Sync {
    /// A new key was inserted.
    fn inserted(&self);

    /// An existing key was repositioned.
    fn updated(&self);

    /// A key was removed.
    fn removed(&self);

    /// `count` keys were removed from the head by `pop_n`.
    fn popped(&self, count: usize);

    /// A mutation was refused.
    fn rejected(&self, error: &RegistryError);
}

/// Discards every event.
#[derive(Default)]
pub struct NoopMetrics;

impl RegistryMetrics for NoopMetrics {
    fn inserted(&self) {}
    fn updated(&self) {}
    fn removed(&self) {}
    fn popped(&self, _count: usize) {}
    fn rejected(&self, _error: &RegistryError) {}
}

/// Atomic counters for every registry event.
#[derive(Default)]
pub struct CounterMetrics {
    /// Successful inserts.
    pub inserts: AtomicU64,

    /// Successful updates.
    pub updates: AtomicU64,

    /// Successful removes.
    pub removes: AtomicU64,

    /// Keys removed by `pop_n`.
    pub popped: AtomicU64,

    /// Mutations refused because of bad hints.
    pub hint_rejections: AtomicU64,

    /// Mutations refused for any other reason.
    pub other_rejections: AtomicU64,
}

impl CounterMetrics {
    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            hint_rejections: self.hint_rejections.load(Ordering::Relaxed),
            other_rejections: self.other_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Successful inserts.
    pub inserts: u64,
    /// Successful updates.
    pub updates: u64,
    /// Successful removes.
    pub removes: u64,
    /// Keys removed by `pop_n`.
    pub popped: u64,
    /// Mutations refused because of bad hints.
    pub hint_rejections: u64,
    /// Mutations refused for any other reason.
    pub other_rejections: u64,
}

impl RegistryMetrics for CounterMetrics {
    fn inserted(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    fn updated(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn removed(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    fn popped(&self, count: usize) {
        self.popped.fetch_add(count as u64, Ordering::Relaxed);
    }

    fn rejected(&self, error: &RegistryError) {
        match error {
            RegistryError::HintMismatch(_) => {
                self.hint_rejections.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.other_rejections.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Returns the default metrics implementation, [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn RegistryMetrics> {
    Arc::new(NoopMetrics)
}
