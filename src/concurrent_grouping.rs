//! ConcurrentGrouping: snapshot-publishing, lock-serialized grouping.

use core::fmt;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// A thread-safe [`Grouping`](crate::Grouping) that publishes immutable
/// snapshots.
///
/// Each mutation rebuilds the element list and swaps in a fresh
/// `Arc<[E]>`; the read-modify-write is serialized through a write lock,
/// so concurrent mutators cannot lose each other's updates. Readers take
/// a cheap [`snapshot`](Self::snapshot) and iterate it without holding
/// any lock.
pub struct ConcurrentGrouping<K, E> {
    key: K,
    elements: RwLock<Arc<[E]>>,
}

impl<K, E> ConcurrentGrouping<K, E> {
    /// Creates an empty grouping for `key`.
    pub fn new(key: K) -> Self {
        Self {
            key,
            elements: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Creates a grouping for `key` seeded with `elements`.
    pub fn with_elements<I>(key: K, elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        Self {
            key,
            elements: RwLock::new(elements.into_iter().collect::<Vec<E>>().into()),
        }
    }

    /// The key shared by all elements of this grouping.
    pub fn key(&self) -> &K {
        &self.key
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<[E]>> {
        self.elements
            .write()
            .expect("concurrent grouping lock poisoned")
    }

    /// The currently published element list. The snapshot is immutable;
    /// later mutations publish new lists and never touch handed-out
    /// snapshots.
    pub fn snapshot(&self) -> Arc<[E]> {
        Arc::clone(
            &self
                .elements
                .read()
                .expect("concurrent grouping lock poisoned"),
        )
    }

    /// Number of elements in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns true if the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Returns true if `element` occurs in the current snapshot.
    pub fn contains(&self, element: &E) -> bool
    where
        E: PartialEq,
    {
        self.snapshot().contains(element)
    }

    /// Publishes an empty element list.
    pub fn clear(&self) {
        *self.write() = Arc::from(Vec::new());
    }
}

impl<K, E: Clone> ConcurrentGrouping<K, E> {
    /// Appends an element, publishing a new snapshot.
    pub fn add(&self, element: E) {
        let mut slot = self.write();
        let mut next = slot.to_vec();
        next.push(element);
        *slot = next.into();
    }

    /// Producer side of the producer/consumer contract. The grouping is
    /// unbounded, so this always succeeds.
    pub fn try_add(&self, element: E) -> bool {
        self.add(element);
        true
    }

    /// Consumer side: removes and returns the first element of the
    /// current list, or None when empty. Under contention each element
    /// is taken by exactly one caller.
    pub fn try_take(&self) -> Option<E> {
        let mut slot = self.write();
        let first = slot.first()?.clone();
        *slot = slot[1..].to_vec().into();
        Some(first)
    }

    /// Removes the first occurrence of `element`, publishing a new
    /// snapshot. Returns false if no occurrence exists.
    pub fn remove(&self, element: &E) -> bool
    where
        E: PartialEq,
    {
        let mut slot = self.write();
        match slot.iter().position(|e| e == element) {
            Some(index) => {
                let mut next = slot.to_vec();
                next.remove(index);
                *slot = next.into();
                true
            }
            None => false,
        }
    }
}

impl<K, E> fmt::Debug for ConcurrentGrouping<K, E>
where
    K: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentGrouping")
            .field("key", &self.key)
            .field("elements", &self.snapshot())
            .finish()
    }
}
