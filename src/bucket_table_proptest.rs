#![cfg(test)]

// Property tests for BucketTable kept inside the crate so they can check
// the internal chain invariants after every operation.

use crate::bucket_table::BucketTable;
use crate::config::TableConfig;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => "[a-z]{0,5}".prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap. After
// each op: size parity, every node on the chain its hash selects, and the
// bucket count a power of two that never shrinks.
fn run_against_model<S: BuildHasher>(
    mut sut: BucketTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let key = |i: usize| Key(pool[i].clone());
    let mut buckets = sut.bucket_count();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = key(i);
                let before = sut.len();
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                if prev.is_some() {
                    prop_assert_eq!(sut.len(), before, "update must not change size");
                }
            }
            OpI::Remove(i) => {
                let k = key(i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Get(i) => {
                let k = key(i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key(i);
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.saturating_add(d);
                }
                if let Some(mv) = model.get_mut(&k) {
                    *mv = mv.saturating_add(d);
                }
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
        }

        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.bucket_count() >= buckets, "bucket array shrank");
        buckets = sut.bucket_count();
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_against_model(BucketTable::new(), &pool, ops)?;
    }
}

// Tiny tables grow often, which puts the rehash on the hot path.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_small_table((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new().with_buckets(1).with_load_factor(0.5);
        let sut = BucketTable::with_config(cfg).expect("valid config");
        run_against_model(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares bucket 0.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_against_model(BucketTable::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: a value written by `put` is returned by `get` for any key,
// and a never-inserted key reads as absent.
proptest! {
    #[test]
    fn prop_put_then_get(entries in proptest::collection::hash_map(any::<u64>(), any::<u32>(), 0..300), probe in any::<u64>()) {
        let mut t = BucketTable::new();
        for (k, v) in &entries {
            t.put(*k, *v);
        }
        prop_assert_eq!(t.len(), entries.len());
        for (k, v) in &entries {
            prop_assert_eq!(t.get(k), Some(v));
        }
        if !entries.contains_key(&probe) {
            prop_assert!(t.get(&probe).is_none());
        }
        t.check_invariants();
    }
}
