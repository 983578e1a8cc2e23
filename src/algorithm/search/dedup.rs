//! Diagonal-bucketed range store suppressing redundant re-extension.
//!
//! Diagonals (`query offset - subject offset`, database coordinates) are
//! coarsened into buckets by a divisor derived from the collection sizes.
//! Each bucket keeps a start-sorted vector of ranges, guarded by its own
//! mutex. Positions are query database offsets. On one diagonal, stored
//! ranges never overlap: an insert overlapping an existing range on the same
//! diagonal is reported as already present and leaves the bucket unchanged.

use std::sync::{Mutex, MutexGuard};

use super::constants::{DIAGONALS_PER_BUCKET, MAX_DEDUP_BUCKETS};

/// Inclusive range `[start, stop]` on one diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagonalRange {
    pub diagonal: i64,
    pub start: u64,
    pub stop: u64,
}

impl DiagonalRange {
    #[inline]
    fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.stop
    }

    #[inline]
    fn overlaps(&self, start: u64, stop: u64) -> bool {
        self.start <= stop && start <= self.stop
    }
}

#[derive(Debug, Default)]
struct Bucket {
    ranges: Vec<DiagonalRange>,
    /// Longest stored range, bounds the backward scan
    longest: u64,
}

impl Bucket {
    /// Ranges that may contain or overlap positions up to `stop`, i.e. those
    /// starting no later than `stop` and no earlier than `from - longest`.
    fn candidates(&self, from: u64, stop: u64) -> impl Iterator<Item = &DiagonalRange> {
        let end = self.ranges.partition_point(|r| r.start <= stop);
        let lower = from.saturating_sub(self.longest);
        let begin = self.ranges[..end].partition_point(|r| r.start < lower);
        self.ranges[begin..end].iter()
    }
}

pub struct DiagonalDedup {
    buckets: Vec<Mutex<Bucket>>,
    min_diagonal: i64,
    divisor: u64,
}

impl DiagonalDedup {
    /// Store covering diagonals `-subject_residues..=query_residues`.
    pub fn new(query_residues: usize, subject_residues: usize) -> Self {
        let span = (query_residues + subject_residues + 1) as u64;
        let count = (span / DIAGONALS_PER_BUCKET as u64).clamp(1, MAX_DEDUP_BUCKETS as u64);
        let divisor = span.div_ceil(count).max(1);
        Self {
            buckets: (0..count).map(|_| Mutex::new(Bucket::default())).collect(),
            min_diagonal: -(subject_residues as i64),
            divisor,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_of(&self, diagonal: i64) -> usize {
        let shifted = (diagonal - self.min_diagonal).max(0) as u64;
        ((shifted / self.divisor) as usize).min(self.buckets.len() - 1)
    }

    #[inline]
    fn lock(&self, bucket: usize) -> MutexGuard<'_, Bucket> {
        // Ranges are only ever appended, so a poisoned bucket is still consistent
        self.buckets[bucket].lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `[start, stop]` on `diagonal`. Returns true when an
    /// overlapping range already existed on that diagonal; the store is then
    /// unchanged.
    pub fn insert(&self, start: u64, stop: u64, diagonal: i64) -> bool {
        let (start, stop) = (start.min(stop), start.max(stop));
        let mut bucket = self.lock(self.bucket_of(diagonal));
        if bucket
            .candidates(start, stop)
            .any(|r| r.diagonal == diagonal && r.overlaps(start, stop))
        {
            return true;
        }
        let at = bucket.ranges.partition_point(|r| r.start <= start);
        bucket.ranges.insert(
            at,
            DiagonalRange {
                diagonal,
                start,
                stop,
            },
        );
        bucket.longest = bucket.longest.max(stop - start);
        false
    }

    /// True when a stored range on `diagonal` contains `pos`.
    pub fn exists(&self, pos: u64, diagonal: i64) -> bool {
        let bucket = self.lock(self.bucket_of(diagonal));
        let found = bucket
            .candidates(pos, pos)
            .any(|r| r.diagonal == diagonal && r.contains(pos));
        found
    }

    /// True when a range within `band` diagonals of `diagonal` contains `pos`.
    pub fn exists_within(&self, pos: u64, diagonal: i64, band: usize) -> bool {
        let band = band as i64;
        let first = self.bucket_of(diagonal - band);
        let last = self.bucket_of(diagonal + band);
        (first..=last).any(|b| {
            let bucket = self.lock(b);
            let found = bucket
                .candidates(pos, pos)
                .any(|r| (r.diagonal - diagonal).abs() <= band && r.contains(pos));
            found
        })
    }

    /// Stored ranges across all buckets.
    pub fn len(&self) -> usize {
        (0..self.buckets.len()).map(|b| self.lock(b).ranges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment() {
        let dedup = DiagonalDedup::new(1000, 1000);
        assert!(!dedup.insert(10, 20, 5));
        assert!(dedup.exists(15, 5));
        assert!(dedup.exists(10, 5));
        assert!(dedup.exists(20, 5));
        assert!(!dedup.exists(25, 5));
        assert!(!dedup.exists(15, 6));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let dedup = DiagonalDedup::new(100, 100);
        assert!(!dedup.insert(10, 20, -3));
        assert!(dedup.insert(10, 20, -3));
        assert!(dedup.insert(12, 14, -3));
        assert!(dedup.insert(18, 30, -3));
        assert_eq!(dedup.len(), 1);
        assert!(!dedup.insert(21, 30, -3));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_neighbouring_diagonals_share_buckets() {
        let dedup = DiagonalDedup::new(10_000, 10_000);
        assert!(dedup.bucket_count() > 1);
        assert!(!dedup.insert(100, 400, 50));
        assert!(!dedup.insert(120, 130, 51));
        assert!(dedup.exists_within(300, 53, 3));
        assert!(!dedup.exists_within(300, 54, 3));
        assert!(dedup.exists(125, 51));
    }

    #[test]
    fn test_long_range_found_behind_short_ones() {
        let dedup = DiagonalDedup::new(100, 100);
        dedup.insert(0, 90, 0);
        for i in 0..10 {
            dedup.insert(10 + i * 5, 12 + i * 5, 1);
        }
        assert!(dedup.exists(89, 0));
    }

    #[test]
    fn test_concurrent_inserts() {
        let dedup = DiagonalDedup::new(10_000, 10_000);
        std::thread::scope(|scope| {
            for t in 0..4u64 {
                let dedup = &dedup;
                scope.spawn(move || {
                    for i in 0..100u64 {
                        dedup.insert(i * 10, i * 10 + 5, (t * 7) as i64);
                    }
                });
            }
        });
        assert_eq!(dedup.len(), 400);
        assert!(dedup.exists(993, 21));
    }
}
