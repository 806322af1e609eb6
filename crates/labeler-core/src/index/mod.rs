//! Containment index over key ranges.
//!
//! Answers "which ranges fully contain `[start, end)`" for a mutable set of ranges.
//!
//! Entries are kept sorted by start key, so every candidate (`entry.start <= start`) lives in a
//! prefix located by binary search. Over that sorted array sits an implicit balanced tree: the
//! node for the slice `[lo, hi)` is the element at `lo + (hi - lo) / 2`, and `max_end` caches the
//! position of the entry with the greatest end key in the slice. A query walks the tree and skips
//! any slice whose greatest end key is still below the queried end.
//!
//! Mutations rebuild the augmentation in O(n); queries cost O(log n + k) in the typical case.
use std::{cmp::Ordering, collections::BTreeMap, ops::Bound};

use labeler_model::KeyRangeRule;

#[derive(Debug, Clone)]
struct Entry<V> {
    id: String,
    start: Vec<u8>,
    end: Vec<u8>,
    value: V,
}

/// Upper bound of a range where the empty key is +inf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndKey<'a>(&'a [u8]);

impl Ord for EndKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_empty(), other.0.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.cmp(other.0),
        }
    }
}

impl PartialOrd for EndKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Set of identified key ranges with a containment query.
#[derive(Debug, Clone)]
pub struct RangeIndex<V> {
    /// Sorted by `(start, id)`.
    entries: Vec<Entry<V>>,
    /// Implicit-tree node -> position of the greatest end key in its slice.
    max_end: Vec<usize>,
    /// Reference count of every non-empty boundary key.
    boundaries: BTreeMap<Vec<u8>, usize>,
}

impl<V> Default for RangeIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RangeIndex<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_end: Vec::new(),
            boundaries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Insert a range under `id`, replacing any previous range with the same id.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, id: impl Into<String>, range: &KeyRangeRule, value: V) -> Option<V> {
        let id = id.into();
        let old = self.take(&id);

        let entry = Entry {
            start: range.start_key().to_vec(),
            end: range.end_key().to_vec(),
            id,
            value,
        };
        let pos = self.entries.partition_point(|e| {
            (e.start.as_slice(), e.id.as_str()) < (entry.start.as_slice(), entry.id.as_str())
        });
        self.retain_boundaries(&entry.start, &entry.end);
        self.entries.insert(pos, entry);

        self.rebuild();
        old
    }

    /// Remove the range stored under `id`.
    pub fn remove(&mut self, id: &str) -> Option<V> {
        let old = self.take(id)?;
        self.rebuild();
        Some(old)
    }

    /// Values of every range that contains `[start, end)`, ordered by id.
    ///
    /// Empty `start` / `end` denote -inf / +inf, on the query as well as on the stored ranges.
    pub fn query(&self, start: &[u8], end: &[u8]) -> Vec<&V> {
        let limit = self.entries.partition_point(|e| e.start.as_slice() <= start);
        let mut hits = Vec::new();
        self.collect(0, self.entries.len(), limit, EndKey(end), &mut hits);

        hits.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        hits.into_iter().map(|e| &e.value).collect()
    }

    /// Distinct boundary keys of stored ranges lying strictly inside `(start, end)`.
    ///
    /// An empty `end` means +inf. Keys are returned in ascending order.
    pub fn split_keys(&self, start: &[u8], end: &[u8]) -> Vec<Vec<u8>> {
        if !end.is_empty() && start >= end {
            return Vec::new();
        }
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        self.boundaries
            .range::<[u8], _>((Bound::Excluded(start), upper))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Iterate `(id, value)` pairs in start-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|e| (e.id.as_str(), &e.value))
    }

    fn take(&mut self, id: &str) -> Option<V> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(pos);
        self.release_boundaries(&entry.start, &entry.end);
        Some(entry.value)
    }

    fn retain_boundaries(&mut self, start: &[u8], end: &[u8]) {
        for key in [start, end] {
            if !key.is_empty() {
                *self.boundaries.entry(key.to_vec()).or_default() += 1;
            }
        }
    }

    fn release_boundaries(&mut self, start: &[u8], end: &[u8]) {
        for key in [start, end] {
            if key.is_empty() {
                continue;
            }
            if let Some(count) = self.boundaries.get_mut(key) {
                *count -= 1;
                if *count == 0 {
                    self.boundaries.remove(key);
                }
            }
        }
    }

    fn rebuild(&mut self) {
        self.max_end = vec![0; self.entries.len()];
        if !self.entries.is_empty() {
            self.build(0, self.entries.len());
        }
    }

    fn build(&mut self, lo: usize, hi: usize) -> usize {
        let mid = lo + (hi - lo) / 2;
        let mut best = mid;
        if lo < mid {
            let left = self.build(lo, mid);
            best = self.wider(best, left);
        }
        if mid + 1 < hi {
            let right = self.build(mid + 1, hi);
            best = self.wider(best, right);
        }
        self.max_end[mid] = best;
        best
    }

    fn wider(&self, a: usize, b: usize) -> usize {
        if EndKey(&self.entries[b].end) > EndKey(&self.entries[a].end) {
            b
        } else {
            a
        }
    }

    fn collect<'a>(
        &'a self,
        lo: usize,
        hi: usize,
        limit: usize,
        end: EndKey<'_>,
        out: &mut Vec<&'a Entry<V>>,
    ) {
        if lo >= hi || lo >= limit {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        if EndKey(&self.entries[self.max_end[mid]].end) < end {
            return;
        }

        self.collect(lo, mid, limit, end, out);
        if mid < limit {
            let entry = &self.entries[mid];
            if EndKey(&entry.end) >= end {
                out.push(entry);
            }
            self.collect(mid + 1, hi, limit, end, out);
        }
    }
}
