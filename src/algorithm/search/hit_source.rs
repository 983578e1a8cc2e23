//! HitSource: walks the seed space and yields one Hit per shared seed batch.
//!
//! A source owns an ordered list of seed codes. Seeds with no occurrence on
//! either side are skipped. A seed whose occurrence lists are longer than the
//! batch size is cut into sub-batches, and every (subject chunk, query chunk)
//! combination becomes its own Hit, so the union of candidates is unchanged.
//!
//! `split(n)` partitions the remaining codes among `n` children. Each code
//! lands in exactly one child and keeps its relative order there, so draining
//! all children yields the same candidate multiset as draining the parent.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::seed::{Neighborhood, SeedCode, SeedIndex};

use super::hit::Hit;

/// Progress of a [`HitSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSourceState {
    NotStarted,
    Iterating,
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct HitSourceConfig {
    /// Window prefetched around every occurrence
    pub neighborhood: Option<Neighborhood>,
    /// Maximum occurrences per side in one Hit
    pub batch_size: usize,
    /// Per-seed occurrence cap on each side, 0 = unlimited
    pub max_occurrences: usize,
}

impl Default for HitSourceConfig {
    fn default() -> Self {
        Self {
            neighborhood: None,
            batch_size: 20_000,
            max_occurrences: 0,
        }
    }
}

/// Counters shared by a source and all of its split children.
#[derive(Debug, Default)]
pub struct HitCounters {
    pub seeds_visited: AtomicUsize,
    pub seeds_skipped: AtomicUsize,
    pub hits: AtomicUsize,
    pub pairs: AtomicUsize,
}

impl HitCounters {
    pub fn seeds_visited(&self) -> usize {
        self.seeds_visited.load(AtomicOrdering::Relaxed)
    }

    pub fn seeds_skipped(&self) -> usize {
        self.seeds_skipped.load(AtomicOrdering::Relaxed)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    pub fn pairs(&self) -> usize {
        self.pairs.load(AtomicOrdering::Relaxed)
    }
}

/// Position inside the current seed's sub-batch grid.
#[derive(Debug, Clone, Copy, Default)]
struct SeedCursor {
    subject_total: usize,
    query_total: usize,
    subject_chunk: usize,
    query_chunk: usize,
}

pub struct HitSource<'a> {
    subject: &'a SeedIndex,
    query: &'a SeedIndex,
    codes: Vec<SeedCode>,
    next_code: usize,
    current: Option<(SeedCode, SeedCursor)>,
    state: HitSourceState,
    config: HitSourceConfig,
    counters: Arc<HitCounters>,
    progress: Option<ProgressBar>,
}

impl<'a> HitSource<'a> {
    pub fn new(subject: &'a SeedIndex, query: &'a SeedIndex, codes: Vec<SeedCode>, config: HitSourceConfig) -> Self {
        let config = HitSourceConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        Self {
            subject,
            query,
            codes,
            next_code: 0,
            current: None,
            state: HitSourceState::NotStarted,
            config,
            counters: Arc::new(HitCounters::default()),
            progress: None,
        }
    }

    /// Advance `progress` by one for every seed code consumed.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> HitSourceState {
        self.state
    }

    pub fn codes(&self) -> &[SeedCode] {
        &self.codes[self.next_code..]
    }

    pub fn counters(&self) -> &Arc<HitCounters> {
        &self.counters
    }

    /// Prefetch `neighborhood` around every occurrence from now on.
    pub(crate) fn set_neighborhood(&mut self, neighborhood: Neighborhood) {
        self.config.neighborhood = Some(neighborhood);
    }

    fn capped(&self, count: usize) -> usize {
        match self.config.max_occurrences {
            0 => count,
            cap => count.min(cap),
        }
    }

    /// Candidate pairs a seed contributes, the load estimate used for
    /// balancing.
    fn weight(&self, code: SeedCode) -> u64 {
        let s = self.capped(self.subject.occurrence_count(code)) as u64;
        let q = self.capped(self.query.occurrence_count(code)) as u64;
        s * q
    }

    /// Sort the remaining seeds by descending occurrence product. Changes
    /// only the visiting order, not the set of candidates.
    pub fn reorder_by_load(&mut self) {
        let mut weighted: Vec<(u64, SeedCode)> = self.codes[self.next_code..]
            .iter()
            .map(|&c| (self.weight(c), c))
            .collect();
        weighted.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        self.codes.truncate(self.next_code);
        self.codes.extend(weighted.into_iter().map(|(_, c)| c));
        log::debug!("hit source reordered {} seeds by load", self.codes.len() - self.next_code);
    }

    /// Partition the seeds not yet started into `n` children sharing this
    /// source's counters. Heavy-first (reordered) code lists are dealt out
    /// round-robin; otherwise contiguous runs of roughly equal load are cut.
    pub fn split(self, n: usize, round_robin: bool) -> Vec<HitSource<'a>> {
        let n = n.max(1);
        let remaining = &self.codes[self.next_code..];
        let mut parts: Vec<Vec<SeedCode>> = vec![Vec::new(); n];
        if round_robin {
            for (i, &code) in remaining.iter().enumerate() {
                parts[i % n].push(code);
            }
        } else {
            let weights: Vec<u64> = remaining.iter().map(|&c| self.weight(c).max(1)).collect();
            let total: u64 = weights.iter().sum();
            let mut part = 0usize;
            let mut acc = 0u64;
            for (&code, &w) in remaining.iter().zip(&weights) {
                // Move on once this part holds its share of the total load
                while part + 1 < n && acc * n as u64 >= total * (part as u64 + 1) {
                    part += 1;
                }
                parts[part].push(code);
                acc += w;
            }
        }
        parts
            .into_iter()
            .map(|codes| HitSource {
                subject: self.subject,
                query: self.query,
                codes,
                next_code: 0,
                current: None,
                state: HitSourceState::NotStarted,
                config: self.config,
                counters: Arc::clone(&self.counters),
                progress: self.progress.clone(),
            })
            .collect()
    }

    /// Start the next seed with occurrences on both sides.
    fn start_next_seed(&mut self) -> bool {
        while let Some(&code) = self.codes.get(self.next_code) {
            self.next_code += 1;
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
            let subject_total = self.capped(self.subject.occurrence_count(code));
            let query_total = self.capped(self.query.occurrence_count(code));
            if subject_total == 0 || query_total == 0 {
                self.counters.seeds_skipped.fetch_add(1, AtomicOrdering::Relaxed);
                continue;
            }
            self.counters.seeds_visited.fetch_add(1, AtomicOrdering::Relaxed);
            self.current = Some((
                code,
                SeedCursor {
                    subject_total,
                    query_total,
                    subject_chunk: 0,
                    query_chunk: 0,
                },
            ));
            return true;
        }
        false
    }

    /// Refill `hit` with the next seed batch. Returns false once the source
    /// is exhausted.
    pub fn next_hit(&mut self, hit: &mut Hit<'a>) -> bool {
        if self.state == HitSourceState::Done {
            return false;
        }
        self.state = HitSourceState::Iterating;
        if self.current.is_none() && !self.start_next_seed() {
            self.state = HitSourceState::Done;
            return false;
        }
        let Some((code, mut cursor)) = self.current else {
            self.state = HitSourceState::Done;
            return false;
        };

        let batch = self.config.batch_size;
        let neighborhood = self.config.neighborhood;
        hit.reset(code, neighborhood);
        let s_start = cursor.subject_chunk * batch;
        let q_start = cursor.query_chunk * batch;
        let s_take = batch.min(cursor.subject_total - s_start);
        let q_take = batch.min(cursor.query_total - q_start);

        let mut it = self.subject.occurrence_iterator(code, neighborhood, cursor.subject_total);
        if s_start > 0 {
            it.nth(s_start - 1);
        }
        for _ in 0..s_take {
            match it.next_with_neighborhood() {
                Some((occ, window)) => hit.push_subject(occ, window),
                None => break,
            }
        }
        let mut it = self.query.occurrence_iterator(code, neighborhood, cursor.query_total);
        if q_start > 0 {
            it.nth(q_start - 1);
        }
        for _ in 0..q_take {
            match it.next_with_neighborhood() {
                Some((occ, window)) => hit.push_query(occ, window),
                None => break,
            }
        }

        // Advance query chunks fastest, then subject chunks, then the seed
        cursor.query_chunk += 1;
        if cursor.query_chunk * batch >= cursor.query_total {
            cursor.query_chunk = 0;
            cursor.subject_chunk += 1;
        }
        self.current = if cursor.subject_chunk * batch >= cursor.subject_total {
            None
        } else {
            Some((code, cursor))
        };

        self.counters.hits.fetch_add(1, AtomicOrdering::Relaxed);
        self.counters
            .pairs
            .fetch_add(hit.candidate_count(), AtomicOrdering::Relaxed);
        true
    }
}
