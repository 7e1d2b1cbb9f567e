use std::hash::{BuildHasherDefault, Hasher};

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::{BufferConfig, Insertion, ReplacementMode, UnorderedBuffer};

#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 8) | u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

type Buffer = UnorderedBuffer<u64, u64, BuildHasherDefault<IdentityHasher>>;

const CAPACITY: usize = 16;

/// Reference model: one optional (key, value, priority) per bucket plus the
/// traversal order as bucket indices, front first
struct Model {
    buckets: Vec<Option<(u64, u64, u32)>>,
    order: Vec<usize>,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            buckets: vec![None; capacity],
            order: Vec::new(),
        }
    }

    fn expected_kind(&self, key: u64) -> Option<Insertion> {
        match self.buckets[key as usize % self.buckets.len()] {
            None => Some(Insertion::Occupied),
            Some((k, _, _)) if k == key => Some(Insertion::Matched),
            // a collision, decided by the rng
            Some(_) => None,
        }
    }

    fn apply(&mut self, key: u64, value: u64, kind: Insertion) {
        let idx = key as usize % self.buckets.len();
        let bucket = &mut self.buckets[idx];
        match kind {
            Insertion::Occupied => {
                *bucket = Some((key, value, 1));
                self.order.insert(0, idx);
            }
            Insertion::Matched => {
                if let Some((_, _, priority)) = bucket {
                    *priority += 1;
                }
            }
            Insertion::Displaced => *bucket = Some((key, value, 1)),
            Insertion::Retained => {}
        }
    }

    fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.order.clear();
    }

    fn entries(&self) -> Vec<(u64, u64)> {
        self.order
            .iter()
            .filter_map(|&idx| self.buckets[idx].map(|(k, v, _)| (k, v)))
            .collect()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u64, u64),
    Force(u64, u64),
    Get(u64),
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // small key space so collisions and repeats are common
    let key = 0u64..64;
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        20 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Force(k, v)),
        30 => key.prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=500)
}

fn buffer(seed: u64) -> Buffer {
    UnorderedBuffer::from_parts(
        BufferConfig::new(CAPACITY),
        Default::default(),
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_model_equivalence(ops in ops_strategy(), seed in any::<u64>()) {
        let mut b = buffer(seed);
        let mut m = Model::new(CAPACITY);

        for op in ops {
            match op {
                Op::Insert(key, value) | Op::Force(key, value) => {
                    let mode = match op {
                        Op::Force(..) => ReplacementMode::Deterministic,
                        _ => ReplacementMode::Probabilistic,
                    };
                    let expected = m.expected_kind(key);
                    let outcome = b.emplace(key, value, mode);

                    match expected {
                        Some(kind) => {
                            prop_assert_eq!(outcome.kind, kind);
                        }
                        None if mode == ReplacementMode::Deterministic => {
                            prop_assert_eq!(outcome.kind, Insertion::Displaced);
                        }
                        None => {
                            prop_assert!(matches!(
                                outcome.kind,
                                Insertion::Displaced | Insertion::Retained
                            ));
                        }
                    }
                    prop_assert_eq!(outcome.position.bucket_index(), key as usize % CAPACITY);
                    m.apply(key, value, outcome.kind);
                }
                Op::Get(key) => {
                    let idx = key as usize % CAPACITY;
                    let expected = m.buckets[idx].filter(|(k, _, _)| *k == key);
                    prop_assert_eq!(b.get(&key).copied(), expected.map(|(_, v, _)| v));
                    prop_assert_eq!(b.priority(&key), expected.map(|(_, _, p)| p));
                    prop_assert_eq!(b.count(&key), usize::from(expected.is_some()));
                }
                Op::Clear => {
                    b.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(b.len(), m.order.len());
        }

        b.check_invariants();
        let got: Vec<(u64, u64)> = b.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, m.entries());
    }

    #[test]
    fn prop_repeat_insert_raises_priority(key in any::<u64>(), repeats in 1usize..50) {
        let mut b = buffer(0);
        b.insert(key, 1);
        for n in 0..repeats {
            let outcome = b.insert(key, 2);
            prop_assert!(!outcome.inserted());
            prop_assert_eq!(b.priority(&key), Some(n as u32 + 2));
        }
        prop_assert_eq!(b.at(&key), Ok(&1));
    }

    #[test]
    fn prop_positions_survive_unrelated_inserts(keys in prop::collection::vec(0u64..1024, 1..100)) {
        let mut b = buffer(1);
        let first = keys[0];
        let position = b.insert(first, first).position;

        for &key in &keys[1..] {
            if key as usize % CAPACITY != first as usize % CAPACITY {
                b.insert(key, key);
            }
        }

        prop_assert_eq!(b.get_position(position), Some((&first, &first)));
        b.check_invariants();
    }
}
