//! CachedIterable / RefreshableIterable: materialize-once sequence caches.

use core::fmt;
use core::slice;

/// Materialization policy for the caching wrappers.
///
/// `Instant` drains the source when the wrapper is constructed; `Lazy`
/// defers to the first cache access.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Materialize {
    Instant,
    Lazy,
}

/// Where a [`CachedIterable`]'s items currently live. The source is
/// owned by the `Pending` variant and dropped on materialization, so a
/// materialized wrapper with a live source is unrepresentable.
enum State<I> {
    Pending(I),
    Materialized,
}

/// Caches a one-shot source sequence so it can be iterated repeatedly.
///
/// The source is consumed at most once: materialization drains it into
/// an owned cache, and every later iteration replays the cache. If the
/// source panics mid-drain, the items drained so far stay in the cache
/// and the state remains pending, so a retry re-enters the source's own
/// iterator; whether the source can resume meaningfully is the source's
/// contract, not this wrapper's.
pub struct CachedIterable<I: Iterator> {
    state: State<I>,
    cache: Vec<I::Item>,
}

impl<I: Iterator> CachedIterable<I> {
    /// Wraps `source` with the given materialization policy.
    pub fn new(source: I, mode: Materialize) -> Self {
        let mut this = Self {
            state: State::Pending(source),
            cache: Vec::new(),
        };
        if mode == Materialize::Instant {
            this.materialize();
        }
        this
    }

    /// Wraps `source`, draining it immediately.
    pub fn instant(source: I) -> Self {
        Self::new(source, Materialize::Instant)
    }

    /// Wraps `source`, deferring the drain to the first cache access.
    pub fn lazy(source: I) -> Self {
        Self::new(source, Materialize::Lazy)
    }

    /// Returns true once the source has been fully drained into the
    /// cache.
    pub fn has_materialized(&self) -> bool {
        matches!(self.state, State::Materialized)
    }

    /// Drains the source into the cache. Idempotent: calling this when
    /// already materialized is a no-op.
    pub fn materialize(&mut self) {
        let State::Pending(source) = &mut self.state else {
            return;
        };
        // Item-by-item so a panicking source leaves the drained prefix
        // in the cache and the state pending.
        for item in source.by_ref() {
            self.cache.push(item);
        }
        self.state = State::Materialized;
    }

    /// Materializes if needed, then iterates the cached items.
    pub fn iter(&mut self) -> slice::Iter<'_, I::Item> {
        self.materialize();
        self.cache.iter()
    }

    /// Current cache contents, without forcing materialization.
    pub fn cached(&self) -> &[I::Item] {
        &self.cache
    }
}

impl<I: Iterator> IntoIterator for CachedIterable<I> {
    type Item = I::Item;
    type IntoIter = std::vec::IntoIter<I::Item>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.materialize();
        self.cache.into_iter()
    }
}

impl<'a, I: Iterator> IntoIterator for &'a mut CachedIterable<I> {
    type Item = &'a I::Item;
    type IntoIter = slice::Iter<'a, I::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<I: Iterator> fmt::Debug for CachedIterable<I>
where
    I::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedIterable")
            .field("materialized", &self.has_materialized())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Freshness of a [`RefreshableIterable`]'s cache.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Fill {
    Stale,
    Fresh,
}

/// A cache over a restartable sequence, expressed as an iterator
/// factory.
///
/// [`refresh`](Self::refresh) re-consumes the source: eagerly in
/// `Instant` mode, or by marking the cache stale in `Lazy` mode so the
/// rebuild happens on the next access. Construction follows the same
/// policy as [`CachedIterable`].
pub struct RefreshableIterable<F, I>
where
    F: FnMut() -> I,
    I: Iterator,
{
    source: F,
    mode: Materialize,
    cache: Vec<I::Item>,
    fill: Fill,
}

impl<F, I> RefreshableIterable<F, I>
where
    F: FnMut() -> I,
    I: Iterator,
{
    /// Wraps the `source` factory with the given materialization policy.
    pub fn new(source: F, mode: Materialize) -> Self {
        let mut this = Self {
            source,
            mode,
            cache: Vec::new(),
            fill: Fill::Stale,
        };
        if mode == Materialize::Instant {
            this.rebuild();
        }
        this
    }

    /// Wraps `source`, building the cache immediately.
    pub fn instant(source: F) -> Self {
        Self::new(source, Materialize::Instant)
    }

    /// Wraps `source`, deferring the build to the first cache access.
    pub fn lazy(source: F) -> Self {
        Self::new(source, Materialize::Lazy)
    }

    /// Truncates the cache and drains a fresh source into it.
    fn rebuild(&mut self) {
        self.cache.clear();
        for item in (self.source)() {
            self.cache.push(item);
        }
        self.fill = Fill::Fresh;
    }

    /// Returns true while the cache does not reflect the source: before
    /// the first build in `Lazy` mode, or after a deferred refresh.
    pub fn is_stale(&self) -> bool {
        self.fill == Fill::Stale
    }

    /// Returns true once the cache has been built and not invalidated.
    pub fn has_materialized(&self) -> bool {
        self.fill == Fill::Fresh
    }

    /// Re-consumes the source. In `Instant` mode the cache is truncated
    /// and rebuilt now; in `Lazy` mode the cache is only marked stale
    /// and rebuilt on the next access.
    pub fn refresh(&mut self) {
        match self.mode {
            Materialize::Instant => self.rebuild(),
            Materialize::Lazy => self.fill = Fill::Stale,
        }
    }

    /// Rebuilds if stale, then iterates the cached items.
    pub fn iter(&mut self) -> slice::Iter<'_, I::Item> {
        if self.fill == Fill::Stale {
            self.rebuild();
        }
        self.cache.iter()
    }

    /// Current cache contents, without rebuilding. After a lazy refresh
    /// this still returns the stale items.
    pub fn cached(&self) -> &[I::Item] {
        &self.cache
    }
}

impl<'a, F, I> IntoIterator for &'a mut RefreshableIterable<F, I>
where
    F: FnMut() -> I,
    I: Iterator,
{
    type Item = &'a I::Item;
    type IntoIter = slice::Iter<'a, I::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<F, I> fmt::Debug for RefreshableIterable<F, I>
where
    F: FnMut() -> I,
    I: Iterator,
    I::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshableIterable")
            .field("mode", &self.mode)
            .field("stale", &self.is_stale())
            .field("cache", &self.cache)
            .finish()
    }
}
