#![allow(dead_code)]

use std::sync::Once;

use hintlist::registry::OrderedRegistry;
use hintlist::Snapshot;

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Checks ordering, head/tail and length against the registry's own
/// snapshot.
pub fn assert_well_formed<R>(registry: &R)
where
    R: OrderedRegistry<Key = u64, Value = u64>,
{
    let snapshot: Snapshot<u64, u64> = registry.elements();
    assert_eq!(snapshot.len(), registry.len());
    assert_eq!(registry.head(), snapshot.head());
    assert_eq!(registry.tail(), snapshot.tail());
    let values = snapshot.values();
    assert!(
        values.windows(2).all(|pair| pair[0] >= pair[1]),
        "registry out of order: {values:?}"
    );
    let mut keys = snapshot.keys();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), snapshot.len(), "duplicate keys");
    assert!(!keys.contains(&0), "NULL key stored");
    for key in keys {
        assert!(registry.contains(&key));
    }
}
