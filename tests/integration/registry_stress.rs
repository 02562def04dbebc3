#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use hintlist::registry::{
    CounterMetrics, MedianSortedRegistry, OrderedRegistry, RegistryOptions, SortedRegistry,
};
use hintlist::resolver::{NeighborResolver, Snapshot, SnapshotRegistry};
use hintlist::{Change, NaturalOrder, RegistryError, Result};

const ACTIONS: usize = 4_000;
const KEY_SPACE: u64 = 200;
const SEED: u64 = 0x5eed_1157;

#[test]
fn randomized_actions_with_resolved_hints() -> Result<()> {
    common::init_tracing();
    let metrics = Arc::new(CounterMetrics::default());
    let mut registry = MedianSortedRegistry::<u64, u64>::new(
        RegistryOptions::new().metrics(metrics.clone()),
    );
    let resolver: NeighborResolver = NeighborResolver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut expected_popped = 0u64;

    for _ in 0..ACTIONS {
        let key = rng.gen_range(1..=KEY_SPACE);
        let value = rng.gen_range(0..1_000);
        let snapshot = registry.elements();
        match rng.gen_range(0..10) {
            0 if !snapshot.is_empty() => {
                let n = rng.gen_range(0..=snapshot.len().min(3));
                let popped = registry.pop_n(n)?;
                assert_eq!(popped, snapshot.keys()[..n].to_vec());
                expected_popped += n as u64;
            }
            1 | 2 if snapshot.contains(&key) => {
                let removed = registry.remove(key)?;
                assert_eq!(Some(&removed), snapshot.value_of(&key));
            }
            _ if snapshot.contains(&key) => {
                let resolution = resolver.resolve(&snapshot, &Change::new(key, value))?;
                registry.update(key, value, resolution.lesser(), resolution.greater())?;
                assert_eq!(registry.elements(), resolution.snapshot);
            }
            _ => {
                let resolution = resolver.resolve_insert(&snapshot, key, value)?;
                registry.insert(key, value, resolution.lesser(), resolution.greater())?;
                assert_eq!(registry.elements(), resolution.snapshot);
            }
        }
        common::assert_well_formed(registry.list());
        if !registry.is_empty() {
            let middle = (registry.len() - 1) / 2;
            assert_eq!(registry.median_key(), registry.elements().key_at(middle));
        }
    }

    let counts = metrics.snapshot();
    assert_eq!(counts.hint_rejections, 0);
    assert_eq!(counts.other_rejections, 0);
    assert_eq!(counts.popped, expected_popped);
    assert_eq!(
        counts.inserts - counts.removes - counts.popped,
        registry.len() as u64
    );
    Ok(())
}

#[test]
fn randomized_actions_with_guessed_hints() {
    common::init_tracing();
    let metrics = Arc::new(CounterMetrics::default());
    let mut registry =
        SortedRegistry::<u64, u64>::new(RegistryOptions::new().metrics(metrics.clone()));
    let mut mirror = SnapshotRegistry::<u64, u64>::new(Snapshot::new(), NaturalOrder, usize::MAX);
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 0xbad);
    let mut accepted = 0usize;
    let mut refused = 0usize;

    for _ in 0..ACTIONS {
        let key = rng.gen_range(1..=32);
        let value = rng.gen_range(0..16);
        // Guesses are drawn from live keys most of the time so some land.
        let keys = registry.keys();
        let guess = |rng: &mut ChaCha8Rng| -> u64 {
            if keys.is_empty() || rng.gen_bool(0.2) {
                0
            } else {
                keys[rng.gen_range(0..keys.len())]
            }
        };
        let lesser = guess(&mut rng);
        let greater = guess(&mut rng);
        let (outcome, mirrored) = if rng.gen_bool(0.5) {
            (
                registry.insert(key, value, lesser, greater),
                mirror.insert(key, value, lesser, greater),
            )
        } else {
            (
                registry.update(key, value, lesser, greater),
                mirror.update(key, value, lesser, greater),
            )
        };
        assert_eq!(outcome, mirrored);
        match outcome {
            Ok(()) => accepted += 1,
            Err(RegistryError::HintMismatch(_))
            | Err(RegistryError::DuplicateKey)
            | Err(RegistryError::NotFound) => refused += 1,
            Err(other) => panic!("unexpected refusal: {other}"),
        }
        assert_eq!(registry.elements(), *mirror.snapshot());
        common::assert_well_formed(&registry);
    }

    assert!(accepted > 0, "no guessed hint was ever right");
    let counts = metrics.snapshot();
    assert_eq!((counts.inserts + counts.updates) as usize, accepted);
    assert_eq!(
        (counts.hint_rejections + counts.other_rejections) as usize,
        refused
    );
}

#[test]
fn slots_are_reused_after_churn() -> Result<()> {
    let resolver: NeighborResolver = NeighborResolver::default();
    let mut registry = SortedRegistry::<u64, u64>::new(RegistryOptions::new().capacity(16));
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for round in 0..50u64 {
        for key in 1..=16 {
            let value = rng.gen_range(0..100);
            let resolution = resolver.resolve_insert(&registry.elements(), key, value)?;
            registry.insert(key, value, resolution.lesser(), resolution.greater())?;
        }
        assert_eq!(
            registry.insert(17, round, 0, registry.head()),
            Err(RegistryError::CapacityExceeded { capacity: 16 })
        );
        let drained = registry.pop_n(16)?;
        assert_eq!(drained.len(), 16);
        assert!(registry.is_empty());
        assert_eq!((registry.head(), registry.tail()), (0, 0));
    }
    Ok(())
}
