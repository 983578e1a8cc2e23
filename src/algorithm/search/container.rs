//! Thread-safe store of final alignments, bucketed by (query, subject).
//!
//! Buckets are spread over a fixed number of shards, each behind its own
//! mutex, so concurrent inserts only contend when they hash to the same
//! shard. After the pipelines finish, the container is shrunk (shorter
//! alignments contained in longer ones are dropped), sorted, truncated to the
//! output limits and traversed with an [`AlignmentVisitor`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};

use crate::common::{compare_alignments, Alignment};

use super::constants::CONTAINER_SHARDS;

type BucketKey = (u32, u32);
type Shard = FxHashMap<BucketKey, Vec<Alignment>>;

/// Streaming consumer of the container contents.
pub trait AlignmentVisitor {
    fn visit_query(&mut self, _query: u32) -> Result<()> {
        Ok(())
    }

    fn visit_subject(&mut self, _query: u32, _subject: u32) -> Result<()> {
        Ok(())
    }

    fn visit_alignment(&mut self, alignment: &Alignment) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects alignments in traversal order.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    pub alignments: Vec<Alignment>,
}

impl AlignmentVisitor for CollectingVisitor {
    fn visit_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        self.alignments.push(alignment.clone());
        Ok(())
    }
}

pub struct AlignmentContainer {
    shards: Vec<Mutex<Shard>>,
    overlap_fraction: Option<f64>,
}

fn shard_of(key: BucketKey) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % CONTAINER_SHARDS
}

fn shard_mut(shard: &mut Mutex<Shard>) -> &mut Shard {
    shard.get_mut().unwrap_or_else(|e| e.into_inner())
}

/// Drop alignments contained in a longer one of the same bucket. Returns
/// the number removed.
fn shrink_bucket(list: &mut Vec<Alignment>, shift_divisor: usize) -> usize {
    let before = list.len();
    list.sort_by(|a, b| {
        b.span()
            .cmp(&a.span())
            .then(b.score.cmp(&a.score))
            .then_with(|| compare_alignments(a, b))
    });
    let mut kept: Vec<Alignment> = Vec::with_capacity(list.len());
    for candidate in list.drain(..) {
        let dominated = kept.iter().any(|longer| {
            let tolerance = longer.span().min(candidate.span()) / shift_divisor.max(1);
            longer.contains(&candidate, tolerance)
        });
        if !dominated {
            kept.push(candidate);
        }
    }
    *list = kept;
    before - list.len()
}

/// Best alignment of a bucket under [`compare_alignments`].
fn best_of(list: &[Alignment]) -> Option<&Alignment> {
    list.iter().min_by(|a, b| compare_alignments(a, b))
}

impl AlignmentContainer {
    /// `overlap_fraction`: reject an insert when an accepted alignment of the
    /// same bucket, scoring at least as high, covers this fraction of it.
    pub fn new(overlap_fraction: Option<f64>) -> Self {
        Self {
            shards: (0..CONTAINER_SHARDS).map(|_| Mutex::new(Shard::default())).collect(),
            overlap_fraction,
        }
    }

    #[inline]
    fn lock(&self, key: BucketKey) -> MutexGuard<'_, Shard> {
        // Buckets are append-only while locked, a poisoned shard is still consistent
        self.shards[shard_of(key)].lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert unless an alignment with identical ranges on both sequences
    /// is already present. Returns whether it was inserted.
    pub fn insert(&self, alignment: Alignment) -> bool {
        let key = (alignment.query, alignment.subject);
        let mut shard = self.lock(key);
        let bucket = shard.entry(key).or_default();
        if bucket.iter().any(|a| a.same_range(&alignment)) {
            return false;
        }
        if let Some(fraction) = self.overlap_fraction {
            if bucket
                .iter()
                .any(|a| a.score >= alignment.score && alignment.overlap_fraction(a) >= fraction)
            {
                return false;
            }
        }
        bucket.push(alignment);
        true
    }

    /// True when an accepted alignment of (query, subject) already covers the
    /// anchor `(q_offset, s_offset)` within `band` diagonals.
    pub fn does_exist(&self, query: u32, subject: u32, q_offset: usize, s_offset: usize, band: usize) -> bool {
        let key = (query, subject);
        let shard = self.lock(key);
        let found = shard
            .get(&key)
            .is_some_and(|bucket| bucket.iter().any(|a| a.covers(q_offset, s_offset, band)));
        found
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(|e| e.into_inner()).values().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove alignments contained in a longer alignment of the same bucket,
    /// with tolerance `min(span) / shift_divisor`, then sort every bucket.
    /// Returns the number removed.
    pub fn shrink(&mut self, shift_divisor: usize) -> usize {
        let removed = self
            .shards
            .par_iter_mut()
            .map(|shard| {
                shard_mut(shard)
                    .values_mut()
                    .map(|bucket| shrink_bucket(bucket, shift_divisor))
                    .sum::<usize>()
            })
            .sum();
        self.sort();
        removed
    }

    /// Sort every bucket: ascending E-value, then descending bit score, then
    /// coordinates.
    pub fn sort(&mut self) {
        self.shards.par_iter_mut().for_each(|shard| {
            for bucket in shard_mut(shard).values_mut() {
                bucket.sort_by(compare_alignments);
            }
        });
    }

    /// Queries in ascending id, each with its subjects ordered by their best
    /// alignment, then subject id.
    fn ordered_buckets(&mut self) -> BTreeMap<u32, Vec<BucketKey>> {
        let mut by_query: BTreeMap<u32, Vec<BucketKey>> = BTreeMap::new();
        for shard in &mut self.shards {
            for (key, bucket) in shard_mut(shard).iter() {
                if !bucket.is_empty() {
                    by_query.entry(key.0).or_default().push(*key);
                }
            }
        }
        for keys in by_query.values_mut() {
            let mut ranked: Vec<(BucketKey, Option<Alignment>)> = keys
                .iter()
                .map(|&k| (k, self.bucket(k).and_then(|b| best_of(b).cloned())))
                .collect();
            ranked.sort_by(|(ka, a), (kb, b)| {
                let by_best = match (a, b) {
                    (Some(a), Some(b)) => compare_alignments(a, b),
                    _ => Ordering::Equal,
                };
                by_best.then(ka.1.cmp(&kb.1))
            });
            *keys = ranked.into_iter().map(|(k, _)| k).collect();
        }
        by_query
    }

    fn bucket(&mut self, key: BucketKey) -> Option<&Vec<Alignment>> {
        shard_mut(&mut self.shards[shard_of(key)]).get(&key)
    }

    /// Keep at most `max_subjects` subjects per query and `max_per_subject`
    /// alignments per (query, subject). Zero means unlimited. Buckets must
    /// be sorted.
    pub fn truncate(&mut self, max_subjects: usize, max_per_subject: usize) {
        if max_per_subject > 0 {
            for shard in &mut self.shards {
                for bucket in shard_mut(shard).values_mut() {
                    bucket.truncate(max_per_subject);
                }
            }
        }
        if max_subjects > 0 {
            for keys in self.ordered_buckets().into_values() {
                for key in keys.into_iter().skip(max_subjects) {
                    shard_mut(&mut self.shards[shard_of(key)]).remove(&key);
                }
            }
        }
    }

    /// Single-threaded traversal in output order.
    pub fn accept(&mut self, visitor: &mut dyn AlignmentVisitor) -> Result<()> {
        for (query, keys) in self.ordered_buckets() {
            visitor.visit_query(query)?;
            for key in keys {
                visitor.visit_subject(query, key.1)?;
                if let Some(bucket) = self.bucket(key) {
                    for alignment in bucket {
                        visitor.visit_alignment(alignment)?;
                    }
                }
            }
        }
        visitor.finish()
    }

    /// All alignments in traversal order.
    pub fn alignments(&mut self) -> Vec<Alignment> {
        let mut collector = CollectingVisitor::default();
        // CollectingVisitor never fails
        let _ = self.accept(&mut collector);
        collector.alignments
    }
}
