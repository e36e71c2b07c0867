//! Counting sources: the external counting boundary, an in-memory table,
//! and a caching decorator.
//!
//! A [`CountSource`] answers "how many records satisfy this conjunction of
//! variable = code constraints" against a fixed dataset snapshot. For a fixed
//! snapshot the answer is a pure function of the constraint set, which
//! licenses memoization: [`CachedCounts`] wraps any source with a bounded LRU
//! memo plus a precomputed-count overlay for constraint sets materialized
//! ahead of time.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHashMap;

use crate::engine::domain::VarId;
use crate::engine::errors::BayesError;

/// A conjunction of `variable = code` constraints in canonical form:
/// sorted by variable id, so two orderings of the same constraints compare
/// and hash identically.
pub type ConstraintKey = Vec<(VarId, usize)>;

/// Normalizes a constraint slice into its canonical cache key.
pub fn canonical_key(constraints: &[(VarId, usize)]) -> ConstraintKey {
    let mut key = constraints.to_vec();
    key.sort_unstable_by_key(|&(var, _)| var);
    key
}

/// Answers counting queries against a fixed dataset snapshot.
///
/// Implementations must be idempotent and side-effect-free from the caller's
/// perspective: repeated calls with the same constraint set on the same
/// snapshot return the same count. If the underlying data changes between
/// calls, cached results become stale; that is an accepted trade-off for a
/// static analytical snapshot, not a bug.
pub trait CountSource {
    /// Number of records where every listed variable equals the given code.
    ///
    /// An empty constraint slice counts the whole dataset.
    fn count(&self, constraints: &[(VarId, usize)]) -> Result<u64, BayesError>;

    /// Total number of records in the snapshot.
    fn total_records(&self) -> Result<u64, BayesError>;

    /// Optimization hint: a `(parent, child)` pair will be queried together
    /// repeatedly, so the backing store may want an index over both columns.
    ///
    /// Not a correctness requirement; the default implementation does nothing.
    fn prepare_index(&self, _parent: VarId, _child: VarId) {}
}

/// An in-memory record table.
///
/// Rows are dense code vectors indexed by `VarId`. Suitable for tests,
/// benchmarks, and datasets small enough to hold in memory; larger datasets
/// live behind an external [`CountSource`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounts {
    rows: Vec<Vec<usize>>,
}

impl MemoryCounts {
    /// Creates a table from dense rows of codes (one entry per variable,
    /// positions matching `VarId` order).
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Self {
        MemoryCounts { rows }
    }

    /// Appends a row of codes.
    pub fn push(&mut self, row: Vec<usize>) {
        self.rows.push(row);
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CountSource for MemoryCounts {
    fn count(&self, constraints: &[(VarId, usize)]) -> Result<u64, BayesError> {
        let matching = self
            .rows
            .iter()
            .filter(|row| {
                constraints
                    .iter()
                    .all(|&(var, code)| row.get(var.index()) == Some(&code))
            })
            .count();
        Ok(matching as u64)
    }

    fn total_records(&self) -> Result<u64, BayesError> {
        Ok(self.rows.len() as u64)
    }
}

/// Decorates a [`CountSource`] with memoization.
///
/// Lookup order per query: precomputed overlay, then the LRU memo, then the
/// inner source. The memo is bounded with least-recently-used eviction; its
/// capacity is a construction parameter and it can be disabled entirely,
/// which must not change any result, only performance.
///
/// The memo uses interior mutability (`RefCell`): the engine is
/// single-threaded and synchronous, so no locking is needed. The type is
/// deliberately not `Sync`; a concurrent design would guard the memo with a
/// mutex or keep one per worker.
pub struct CachedCounts<S> {
    inner: S,
    memo: Option<RefCell<LruCache<ConstraintKey, u64>>>,
    precomputed: FxHashMap<ConstraintKey, u64>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for CachedCounts<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCounts")
            .field("inner", &self.inner)
            .field("memo_capacity", &self.memo.as_ref().map(|m| m.borrow().cap()))
            .field("precomputed", &self.precomputed.len())
            .finish()
    }
}

impl<S: CountSource> CachedCounts<S> {
    /// Wraps `inner`, memoizing up to `capacity` distinct constraint sets.
    ///
    /// `None` disables the memo.
    pub fn new(inner: S, capacity: Option<NonZeroUsize>) -> Self {
        CachedCounts {
            inner,
            memo: capacity.map(|cap| RefCell::new(LruCache::new(cap))),
            precomputed: FxHashMap::default(),
        }
    }

    /// Registers a materialized count for a constraint set.
    ///
    /// Precomputed entries are consulted before the memo and the inner
    /// source, mirroring a store-side precomputation collection.
    pub fn insert_precomputed(&mut self, constraints: &[(VarId, usize)], count: u64) {
        self.precomputed.insert(canonical_key(constraints), count);
    }

    /// Returns the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: CountSource> CountSource for CachedCounts<S> {
    fn count(&self, constraints: &[(VarId, usize)]) -> Result<u64, BayesError> {
        let key = canonical_key(constraints);
        if let Some(&count) = self.precomputed.get(&key) {
            return Ok(count);
        }
        if let Some(memo) = &self.memo {
            if let Some(&count) = memo.borrow_mut().get(&key) {
                return Ok(count);
            }
        }
        let count = self.inner.count(&key)?;
        if let Some(memo) = &self.memo {
            memo.borrow_mut().put(key, count);
        }
        Ok(count)
    }

    fn total_records(&self) -> Result<u64, BayesError> {
        self.inner.total_records()
    }

    fn prepare_index(&self, parent: VarId, child: VarId) {
        self.inner.prepare_index(parent, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // gender (M=0, F=1), fraud (no=0, yes=1)
    fn table() -> MemoryCounts {
        let mut rows = Vec::new();
        for _ in 0..54 {
            rows.push(vec![0, 0]);
        }
        for _ in 0..6 {
            rows.push(vec![0, 1]);
        }
        for _ in 0..36 {
            rows.push(vec![1, 0]);
        }
        for _ in 0..4 {
            rows.push(vec![1, 1]);
        }
        MemoryCounts::from_rows(rows)
    }

    const GENDER: VarId = VarId(0);
    const FRAUD: VarId = VarId(1);

    #[test]
    fn memory_counts_match_conjunctions() {
        let counts = table();
        assert_eq!(counts.count(&[]).unwrap(), 100);
        assert_eq!(counts.count(&[(GENDER, 0)]).unwrap(), 60);
        assert_eq!(counts.count(&[(FRAUD, 1)]).unwrap(), 10);
        assert_eq!(counts.count(&[(GENDER, 0), (FRAUD, 1)]).unwrap(), 6);
        assert_eq!(counts.total_records().unwrap(), 100);
    }

    #[test]
    fn constraint_order_does_not_matter() {
        let cached = CachedCounts::new(table(), NonZeroUsize::new(16));
        let a = cached.count(&[(GENDER, 0), (FRAUD, 1)]).unwrap();
        let b = cached.count(&[(FRAUD, 1), (GENDER, 0)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cache_toggle_does_not_change_results() {
        let cached = CachedCounts::new(table(), NonZeroUsize::new(16));
        let uncached = CachedCounts::new(table(), None);
        for constraints in [
            vec![],
            vec![(GENDER, 1)],
            vec![(FRAUD, 0)],
            vec![(GENDER, 1), (FRAUD, 0)],
        ] {
            assert_eq!(
                cached.count(&constraints).unwrap(),
                uncached.count(&constraints).unwrap()
            );
        }
    }

    #[test]
    fn tiny_capacity_evicts_but_stays_correct() {
        let cached = CachedCounts::new(table(), NonZeroUsize::new(1));
        // Alternate keys so every query evicts the previous entry.
        for _ in 0..3 {
            assert_eq!(cached.count(&[(GENDER, 0)]).unwrap(), 60);
            assert_eq!(cached.count(&[(GENDER, 1)]).unwrap(), 40);
        }
    }

    #[test]
    fn precomputed_overlay_takes_precedence() {
        let mut cached = CachedCounts::new(table(), NonZeroUsize::new(16));
        // Deliberately wrong value to prove precedence over the inner source.
        cached.insert_precomputed(&[(FRAUD, 1), (GENDER, 0)], 999);
        assert_eq!(cached.count(&[(GENDER, 0), (FRAUD, 1)]).unwrap(), 999);
        // Other keys still hit the inner source.
        assert_eq!(cached.count(&[(GENDER, 0)]).unwrap(), 60);
    }
}
