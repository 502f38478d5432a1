//! bucket-map: a bucket-partitioned hash map with cached iterables and
//! grouping collections.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build each primitive in small, verifiable layers so each piece
//!   can be reasoned about independently.
//! - Layers:
//!   - BucketMap<K, V, S>: the core map. Storage is a power-of-two vector
//!     of first-class Buckets addressed by `hash & (bucket_count - 1)`;
//!     duplicate inserts fail with a bucket-local probe. Includes a
//!     debug-only exclusive-access guard to keep internals consistent
//!     while probing runs user `Hash`/`Eq` code.
//!   - ReadOnlyView<'_, K, V, S>: borrowing projection exposing only the
//!     read subset; mutation is unrepresentable on the view.
//!   - SyncBucketMap<K, V, S>: coarse wrapper serializing every operation
//!     (reads included) through one mutex.
//!   - CachedIterable / RefreshableIterable: materialize-once caches over
//!     one-shot sources and restartable factories.
//!   - Grouping / ConcurrentGrouping: a key paired with the elements
//!     sharing it; the concurrent variant publishes immutable snapshots
//!     with lock-serialized read-modify-write.
//!
//! Constraints
//! - Unique keys: duplicate inserts fail; `set` is the explicit
//!   insert-or-overwrite path.
//! - Keys are immutable post-insert; there is no `key_mut`.
//! - Each entry stores its full `u64` hash at insertion. Probing filters
//!   by stored hash before running `K: Eq`, and regrowth redistributes by
//!   stored hash; `K: Hash` is never invoked after insertion.
//! - Reentrancy: disallowed during map operations (only `K: Eq`/`Hash`
//!   may run); enforced by a debug-only guard, free in release builds.
//!
//! Why this split?
//! - Localize invariants: the map never learns about locking, views, or
//!   caching; each wrapper has one small contract over the layer below.
//! - Clear failure boundaries: the only library error is `DuplicateKey`;
//!   missing-key indexing panics like the standard map.
//!
//! Caching semantics
//! - A `CachedIterable` consumes its source at most once. A panicking
//!   source leaves the drained prefix cached and the state pending; the
//!   wrapper never fabricates a "materialized" state it did not reach.
//! - `RefreshableIterable` owns a factory, so `refresh()` can re-consume
//!   the source: eagerly in `Instant` mode, deferred in `Lazy` mode.
//!
//! Concurrency
//! - `BucketMap` itself is single-owner; sharing goes through
//!   `SyncBucketMap` (one mutex, readers block readers) or, for
//!   groupings, `ConcurrentGrouping` (write-lock-serialized mutation,
//!   lock-free iteration over published snapshots).
//!
//! Notes and non-goals
//! - No async surfaces.
//! - No entry API; `insert_with` covers lazy construction.
//! - Public surface is re-exported here; `bucket` internals stay private
//!   apart from the read-only `Bucket` accessors.

mod bucket;
mod bucket_map;
mod bucket_map_proptest;
mod cached;
mod concurrent_grouping;
mod grouping;
pub mod guard;
mod read_only;
mod sync_map;

// Public surface
pub use bucket::Bucket;
pub use bucket_map::{BucketMap, InsertError};
pub use bucket_map::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut};
pub use cached::{CachedIterable, Materialize, RefreshableIterable};
pub use concurrent_grouping::ConcurrentGrouping;
pub use grouping::Grouping;
pub use guard::DebugGuard;
pub use read_only::ReadOnlyView;
pub use sync_map::{SyncBucketMap, ValueRef};
