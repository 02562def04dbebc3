#![allow(missing_docs)]

//! Random operation sequences applied to every `OrderedRegistry`
//! implementation must produce identical outcomes.

mod common;

use hintlist::registry::{MedianSortedRegistry, OrderedRegistry, RegistryOptions, SortedRegistry};
use hintlist::resolver::{NeighborResolver, Snapshot, SnapshotRegistry};
use hintlist::{Change, Hints, NaturalOrder, RegistryError, Relation};
use proptest::prelude::*;

const KEYS: u64 = 8;
const CAPACITY: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Insert {
        key: u64,
        value: u64,
        lesser: u64,
        greater: u64,
    },
    Update {
        key: u64,
        value: u64,
        lesser: u64,
        greater: u64,
    },
    Remove { key: u64 },
    Pop { n: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    let key = 0..=KEYS;
    let value = 0u64..6;
    prop_oneof![
        4 => (key.clone(), value.clone(), key.clone(), key.clone())
            .prop_map(|(key, value, lesser, greater)| Op::Insert { key, value, lesser, greater }),
        3 => (key.clone(), value, key.clone(), key.clone())
            .prop_map(|(key, value, lesser, greater)| Op::Update { key, value, lesser, greater }),
        1 => key.prop_map(|key| Op::Remove { key }),
        1 => (0usize..4).prop_map(|n| Op::Pop { n }),
    ]
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    Removed(u64),
    Popped(Vec<u64>),
    Refused(RegistryError),
}

fn run<R>(registry: &mut R, op: &Op) -> Outcome
where
    R: OrderedRegistry<Key = u64, Value = u64>,
{
    let result = match *op {
        Op::Insert { key, value, lesser, greater } => {
            registry.insert(key, value, lesser, greater).map(|()| Outcome::Done)
        }
        Op::Update { key, value, lesser, greater } => {
            registry.update(key, value, lesser, greater).map(|()| Outcome::Done)
        }
        Op::Remove { key } => registry.remove(key).map(Outcome::Removed),
        Op::Pop { n } => registry.pop_n(n).map(Outcome::Popped),
    };
    result.unwrap_or_else(Outcome::Refused)
}

fn options() -> RegistryOptions {
    RegistryOptions::new().capacity(CAPACITY)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn implementations_agree_on_arbitrary_hints(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut linked = SortedRegistry::<u64, u64>::new(options());
        let mut median = MedianSortedRegistry::<u64, u64>::new(options());
        let mut mirror =
            SnapshotRegistry::<u64, u64>::new(Snapshot::new(), NaturalOrder, CAPACITY);

        for op in &ops {
            let expected = run(&mut linked, op);
            prop_assert_eq!(&run(&mut median, op), &expected, "median diverged on {:?}", op);
            prop_assert_eq!(&run(&mut mirror, op), &expected, "mirror diverged on {:?}", op);
            prop_assert_eq!(linked.elements(), mirror.elements());
            prop_assert_eq!(linked.elements(), median.elements());
            common::assert_well_formed(&linked);
            common::assert_well_formed(&mirror);
        }
    }

    #[test]
    fn resolved_hints_are_always_accepted(
        changes in prop::collection::vec((1..=KEYS, 0u64..6), 1..60)
    ) {
        let resolver: NeighborResolver = NeighborResolver::default();
        let mut registry = MedianSortedRegistry::<u64, u64>::new(RegistryOptions::default());
        for (key, value) in changes {
            let snapshot = registry.elements();
            let hints = if snapshot.contains(&key) {
                let resolution = resolver.resolve(&snapshot, &Change::new(key, value)).unwrap();
                registry.update(key, value, resolution.lesser(), resolution.greater()).unwrap();
                prop_assert_eq!(registry.elements(), resolution.snapshot);
                resolution.hints
            } else {
                let resolution = resolver.resolve_insert(&snapshot, key, value).unwrap();
                registry.insert(key, value, resolution.lesser(), resolution.greater()).unwrap();
                prop_assert_eq!(registry.elements(), resolution.snapshot);
                resolution.hints
            };
            prop_assert_eq!(registry.list().neighbors(&key), Some(hints));
            common::assert_well_formed(registry.list());
        }
    }

    #[test]
    fn median_sits_at_the_middle_index(values in prop::collection::vec(0u64..1_000, 0..40)) {
        let resolver: NeighborResolver = NeighborResolver::default();
        let mut registry = MedianSortedRegistry::<u64, u64>::new(RegistryOptions::default());
        for (offset, value) in values.iter().enumerate() {
            let key = offset as u64 + 1;
            let resolution = resolver.resolve_insert(&registry.elements(), key, *value).unwrap();
            registry.insert(key, *value, resolution.lesser(), resolution.greater()).unwrap();
        }
        let (snapshot, relations) = registry.elements_with_relations();
        prop_assert_eq!(relations.len(), snapshot.len());
        if snapshot.is_empty() {
            prop_assert_eq!(registry.median_key(), 0);
        } else {
            let middle = (snapshot.len() - 1) / 2;
            prop_assert_eq!(registry.median_key(), snapshot.key_at(middle));
            prop_assert_eq!(registry.count_by_relation(Relation::Greater), middle);
            prop_assert_eq!(registry.count_by_relation(Relation::Equal), 1);
            prop_assert_eq!(
                registry.count_by_relation(Relation::Lesser),
                snapshot.len() - middle - 1
            );
        }
    }

    #[test]
    fn pop_n_removes_the_largest(
        values in prop::collection::vec(0u64..50, 1..30),
        take in 0usize..35,
    ) {
        let resolver: NeighborResolver = NeighborResolver::default();
        let mut registry = SortedRegistry::<u64, u64>::new(RegistryOptions::default());
        for (offset, value) in values.iter().enumerate() {
            let key = offset as u64 + 1;
            let resolution = resolver.resolve_insert(&registry.elements(), key, *value).unwrap();
            registry.insert(key, *value, resolution.lesser(), resolution.greater()).unwrap();
        }
        let before = registry.elements();
        match registry.pop_n(take) {
            Ok(popped) => {
                prop_assert!(take <= before.len());
                prop_assert_eq!(&popped[..], &before.keys()[..take]);
                prop_assert_eq!(registry.keys(), before.keys()[take..].to_vec());
            }
            Err(err) => {
                prop_assert!(take > before.len());
                prop_assert_eq!(
                    err,
                    RegistryError::InsufficientElements { requested: take, available: before.len() }
                );
                prop_assert_eq!(registry.elements(), before);
            }
        }
    }
}

#[test]
fn null_hints_only_fit_an_empty_registry() {
    common::init_tracing();
    let mut registry = SortedRegistry::<u64, u64>::new(RegistryOptions::default());
    let none = Hints::<u64>::none();
    registry
        .insert(1, 10, none.lesser, none.greater)
        .expect("empty registry accepts NULL hints");
    assert!(matches!(
        registry.insert(2, 5, none.lesser, none.greater),
        Err(RegistryError::HintMismatch(_))
    ));
    assert_eq!(registry.keys(), vec![1]);
}
