//! SyncBucketMap: coarse single-lock wrapper around BucketMap.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Deref;
use core::ptr::NonNull;
use std::collections::hash_map::RandomState;
use std::sync::{Mutex, MutexGuard};

use crate::bucket_map::{BucketMap, InsertError};

/// A [`BucketMap`] serialized through a single mutex.
///
/// Every operation, reads included, takes the one lock; readers block
/// other readers. This is the coarse-grained wrapper, not a concurrent
/// map: it trades throughput for a trivially correct sharing model.
pub struct SyncBucketMap<K, V, S = RandomState> {
    inner: Mutex<BucketMap<K, V, S>>,
}

impl<K, V> SyncBucketMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty synchronized map with the default hasher.
    pub fn new() -> Self {
        BucketMap::new().into_sync()
    }
}

impl<K, V> Default for SyncBucketMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> SyncBucketMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty synchronized map using `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        BucketMap::with_hasher(hasher).into_sync()
    }

    fn lock(&self) -> MutexGuard<'_, BucketMap<K, V, S>> {
        // A poisoned lock means a writer panicked mid-operation; the map
        // contents can no longer be trusted.
        self.inner.lock().expect("synchronized map lock poisoned")
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Inserts `key` -> `value`, failing with
    /// [`InsertError::DuplicateKey`] if the key already exists.
    pub fn insert(&self, key: K, value: V) -> Result<(), InsertError> {
        self.lock().insert(key, value)
    }

    /// Bulk insert under a single lock acquisition; stops at the first
    /// duplicate, leaving earlier entries in place.
    pub fn insert_many<I>(&self, entries: I) -> Result<usize, InsertError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.lock().insert_many(entries)
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.lock().set(key, value)
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.lock().remove(key)
    }

    /// Returns true if `key` has an entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.lock().contains_key(key)
    }

    /// Returns true if any entry holds `value`. Full scan under the lock.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.lock().contains_value(value)
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.lock().clear()
    }

    /// Returns a guard-carrying reference to the value for `key`. The
    /// map stays locked until the returned [`ValueRef`] is dropped.
    pub fn get<Q>(&self, key: &Q) -> Option<ValueRef<'_, K, V, S>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        let guard = self.lock();
        let value = guard.get(key).map(NonNull::from)?;
        Some(ValueRef {
            _guard: guard,
            value,
        })
    }

    /// Clones the value for `key` out of the map, releasing the lock
    /// immediately.
    pub fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
        V: Clone,
    {
        self.lock().get(key).cloned()
    }

    /// Deep-copies the current contents out from under the lock.
    pub fn snapshot(&self) -> BucketMap<K, V, S>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        self.lock().clone()
    }

    /// Unwraps the inner map, consuming the wrapper.
    pub fn into_inner(self) -> BucketMap<K, V, S> {
        self.inner
            .into_inner()
            .expect("synchronized map lock poisoned")
    }
}

impl<K, V, S> BucketMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Wraps this map so every operation is serialized through a single
    /// lock.
    pub fn into_sync(self) -> SyncBucketMap<K, V, S> {
        SyncBucketMap {
            inner: Mutex::new(self),
        }
    }
}

impl<K, V, S> fmt::Debug for SyncBucketMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lock().fmt(f)
    }
}

/// A borrowed value that keeps the map's lock held. Dropping the ref
/// releases the lock.
pub struct ValueRef<'a, K, V, S = RandomState> {
    _guard: MutexGuard<'a, BucketMap<K, V, S>>,
    value: NonNull<V>,
}

impl<'a, K, V, S> Deref for ValueRef<'a, K, V, S> {
    type Target = V;

    fn deref(&self) -> &V {
        // SAFETY: `value` points into the map owned by `_guard`; the
        // guard holds the mutex for our whole lifetime, nothing can
        // mutate or move the entry while it is held, and we only hand
        // out shared references.
        unsafe { self.value.as_ref() }
    }
}

impl<'a, K, V, S> fmt::Debug for ValueRef<'a, K, V, S>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}
