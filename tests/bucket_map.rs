// BucketMap public behavior suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Uniqueness: duplicate insert rejects without side effects; `set` is
//   the only overwrite path.
// - Bucket accounting: entries live in exactly one bucket; bucket lens
//   sum to the map len across growth.
// - Ownership: `Clone` deep-copies; views borrow; the sync wrapper
//   serializes shared access.
// - Borrowing: lookups accept any borrowed form of the key.

use bucket_map::{BucketMap, InsertError, SyncBucketMap};
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hasher};

// Test: the duplicate-key scenario end to end.
// Verifies: third insert fails, first value survives, len unchanged.
#[test]
fn duplicate_key_scenario() {
    let mut m: BucketMap<String, i32> = BucketMap::new();
    m.insert("a".to_string(), 1).expect("fresh key");
    m.insert("b".to_string(), 2).expect("fresh key");
    let err = m.insert("a".to_string(), 3).unwrap_err();
    assert_eq!(err, InsertError::DuplicateKey);
    assert_eq!(err.to_string(), "key already exists in the map");
    assert_eq!(m[&"a".to_string()], 1);
    assert_eq!(m.len(), 2);
}

// Test: indexing a missing key.
// Verifies: panics with the standard missing-key message.
#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let m: BucketMap<String, i32> = BucketMap::new();
    let _ = m[&"missing".to_string()];
}

// Test: clone independence in both directions.
// Verifies: removing from the clone leaves the original intact and
// vice versa; values diverge independently after mutation.
#[test]
fn clone_produces_independent_maps() {
    let mut original: BucketMap<String, Vec<i32>> = BucketMap::new();
    original.insert("a".to_string(), vec![1]).unwrap();
    original.insert("b".to_string(), vec![2]).unwrap();

    let mut clone = original.clone();
    clone.remove("a").expect("clone has the key");
    assert!(original.contains_key("a"));

    clone.get_mut("b").expect("present").push(99);
    assert_eq!(original.get("b"), Some(&vec![2]));
    assert_eq!(clone.get("b"), Some(&vec![2, 99]));
}

// Test: read-only view over a live map.
// Verifies: the view reads live buckets and offers no mutating methods;
// the borrow it holds keeps the map immutable for its lifetime.
#[test]
fn read_only_view_forwards_reads() {
    let mut m: BucketMap<String, i32> = BucketMap::new();
    m.insert_many((0..10).map(|i| (format!("k{}", i), i)))
        .unwrap();

    let view = m.as_read_only();
    assert_eq!(view.len(), 10);
    assert_eq!(view.get("k3"), Some(&3));
    assert!(view.contains_value(&9));
    let keys: BTreeSet<&String> = view.keys().collect();
    assert_eq!(keys.len(), 10);

    // Bucket structure is observable but immutable through the view.
    let total: usize = view.buckets().iter().map(|b| b.len()).sum();
    assert_eq!(total, 10);
}

// Test: bulk insert through the whole stack.
// Verifies: `insert_many` is all-or-stop-at-duplicate, reporting the
// number inserted on success.
#[test]
fn insert_many_reports_count() {
    let mut m: BucketMap<u32, u32> = BucketMap::new();
    assert_eq!(m.insert_many((0..500).map(|i| (i, i))), Ok(500));
    assert_eq!(m.len(), 500);
    assert_eq!(
        m.insert_many([(1000, 0), (3, 0)]),
        Err(InsertError::DuplicateKey)
    );
    assert_eq!(m.len(), 501, "entries before the duplicate remain");
}

// Test: growth keeps every entry addressable.
// Assumes: bucket counts double from a small initial allocation.
// Verifies: lookups, removals and re-inserts work across regrowth and
// bucket accounting stays consistent.
#[test]
fn growth_and_removal_cycle() {
    let mut m: BucketMap<u64, u64> = BucketMap::new();
    for i in 0..2048 {
        m.insert(i, i * i).unwrap();
    }
    assert!(m.bucket_count().is_power_of_two());

    for i in (0..2048).step_by(2) {
        assert_eq!(m.remove(&i), Some(i * i));
    }
    assert_eq!(m.len(), 1024);
    for i in (1..2048).step_by(2) {
        assert_eq!(m.get(&i), Some(&(i * i)));
    }

    let bucket_total: usize = m.buckets().iter().map(|b| b.len()).sum();
    assert_eq!(bucket_total, m.len());
}

// Test: injected hasher governs placement.
// Verifies: with a constant hasher every entry shares one bucket, and
// the map still behaves correctly (equality does all the work).
#[test]
fn injected_hasher_controls_placement() {
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

    let mut m: BucketMap<String, i32, ConstBuildHasher> =
        BucketMap::with_hasher(ConstBuildHasher);
    for i in 0..20 {
        m.insert(format!("k{}", i), i).unwrap();
    }
    let nonempty = m.buckets().iter().filter(|b| !b.is_empty()).count();
    assert_eq!(nonempty, 1, "constant hash must map every key to one bucket");
    for i in 0..20 {
        assert_eq!(m.get(format!("k{}", i).as_str()), Some(&i));
    }
}

// Test: synchronized wrapper round trip.
// Verifies: a map moves into the wrapper and back out with contents
// intact; wrapper operations preserve duplicate-key semantics.
#[test]
fn sync_wrapper_round_trip() {
    let mut m: BucketMap<String, i32> = BucketMap::new();
    m.insert("a".to_string(), 1).unwrap();

    let shared: SyncBucketMap<String, i32> = m.into_sync();
    shared.insert("b".to_string(), 2).unwrap();
    assert_eq!(
        shared.insert("a".to_string(), 9),
        Err(InsertError::DuplicateKey)
    );

    let back = shared.into_inner();
    assert_eq!(back.len(), 2);
    assert_eq!(back[&"a".to_string()], 1);
    assert_eq!(back[&"b".to_string()], 2);
}

// Test: Debug output shape.
// Verifies: the map formats as a standard debug map.
#[test]
fn debug_formats_as_map() {
    let mut m: BucketMap<String, i32> = BucketMap::new();
    m.insert("a".to_string(), 1).unwrap();
    let s = format!("{:?}", m);
    assert_eq!(s, r#"{"a": 1}"#);
}
