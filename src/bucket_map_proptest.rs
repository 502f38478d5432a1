#![cfg(test)]

// Property tests for BucketMap kept inside the crate so they can assert
// on bucket-level internals alongside the public API.

use crate::bucket_map::{BucketMap, InsertError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
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

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    InsertWith(usize, i32),
    Set(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertWith(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S>(sut: &mut BucketMap<Key, i32, S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let default_calls = Rc::new(Cell::new(0));

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                }
            }
            OpI::InsertWith(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let counter = default_calls.clone();
                let before = counter.get();
                match sut.insert_with(k.clone(), move || {
                    counter.set(counter.get() + 1);
                    v
                }) {
                    Ok(()) => {
                        prop_assert!(!already, "insert_with must fail on duplicate");
                        prop_assert_eq!(
                            default_calls.get(),
                            before + 1,
                            "constructor must run exactly once on success"
                        );
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(
                            default_calls.get(),
                            before,
                            "constructor must not run on duplicate"
                        );
                    }
                }
            }
            OpI::Set(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.set(k.clone(), v);
                let model_prev = model.insert(k, v);
                prop_assert_eq!(prev, model_prev);
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove_entry(k.0.as_str());
                let model_removed = model.remove(&k);
                match (removed, model_removed) {
                    (Some((kk, vv)), Some(mv)) => {
                        prop_assert!(kk == k);
                        prop_assert_eq!(vv, mv);
                    }
                    (None, None) => {}
                    other => prop_assert!(false, "remove parity violated: {:?}", other),
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(k.0.as_str()), model.get(&k));
                prop_assert_eq!(
                    sut.get_entry(k.0.as_str()).map(|(_, v)| v),
                    model.get(&k)
                );
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(k.0.as_str()) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model must agree on presence");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<Key> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        // 1) Size parity
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // 2) Bucket-level accounting: bucket lens sum to the map len and
        //    no bucket holds a duplicate key.
        let bucket_total: usize = sut.buckets().iter().map(|b| b.len()).sum();
        prop_assert_eq!(bucket_total, sut.len());
        for b in sut.buckets() {
            let uniq: BTreeSet<&Key> = b.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(uniq.len(), b.len(), "duplicate key within a bucket");
        }
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected; `set` overwrites and reports the
//   previous value exactly as the model does.
// - `get`/`get_entry`/`contains_key` parity for present and absent keys.
// - `remove_entry` returns the owned `(K, V)` matching the model.
// - `keys` yields each live entry exactly once; key set equals the
//   model's key set.
// - `len`/`is_empty` parity and bucket accounting after every op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<Key, i32> = BucketMap::new();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution
// within a single bucket.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher): every entry lands in one bucket
// and correctness rests entirely on equality probing.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<Key, i32, ConstBuildHasher> = BucketMap::with_hasher(ConstBuildHasher);
        run_scenario(&mut sut, &pool, ops)?;
    }
}
