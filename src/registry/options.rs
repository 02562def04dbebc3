use std::fmt;
use std::sync::Arc;

use super::metrics::{default_metrics, RegistryMetrics};

/// Configuration supplied when creating a registry.
#[derive(Clone)]
pub struct RegistryOptions {
    /// Maximum number of live entries.
    pub capacity: usize,
    /// Event sink for mutations and rejections.
    pub metrics: Arc<dyn RegistryMetrics>,
}

impl RegistryOptions {
    /// Unbounded registry with no metrics.
    pub fn new() -> Self {
        Self {
            capacity: usize::MAX,
            metrics: default_metrics(),
        }
    }

    /// Sets the maximum number of live entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn RegistryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryOptions")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
