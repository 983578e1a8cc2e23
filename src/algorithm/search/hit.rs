//! Hit: one seed shared by subject and query, with its candidate pairs.
//!
//! A Hit is owned by one pipe, refilled in place for every seed batch and
//! never shared across threads. It holds references to occurrences owned by
//! the two seed indices plus the packed neighborhood windows prefetched for
//! them. Candidates start as the implicit subject × query cross product; the
//! ungapped stage materialises survivors into `pairs`, which later stages
//! only shrink.

use crate::seed::{Neighborhood, SeedCode, SeedOccurrence};

/// Indices into a Hit's subject and query occurrence vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    pub subject: u32,
    pub query: u32,
}

/// Resume point inside the implicit cross product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCursor {
    pub subject: usize,
    pub query: usize,
}

#[derive(Debug, Default)]
pub struct Hit<'a> {
    pub(crate) code: SeedCode,
    pub(crate) subject: Vec<&'a SeedOccurrence>,
    pub(crate) query: Vec<&'a SeedOccurrence>,
    pub(crate) subject_windows: Vec<u8>,
    pub(crate) query_windows: Vec<u8>,
    pub(crate) neighborhood: Option<Neighborhood>,
    pub(crate) pairs: Vec<CandidatePair>,
    /// false while every subject × query pair is still a candidate
    pub(crate) explicit: bool,
}

impl<'a> Hit<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new seed batch, keeping allocations.
    pub fn reset(&mut self, code: SeedCode, neighborhood: Option<Neighborhood>) {
        self.code = code;
        self.neighborhood = neighborhood;
        self.subject.clear();
        self.query.clear();
        self.subject_windows.clear();
        self.query_windows.clear();
        self.pairs.clear();
        self.explicit = false;
    }

    pub fn code(&self) -> SeedCode {
        self.code
    }

    pub fn neighborhood(&self) -> Option<Neighborhood> {
        self.neighborhood
    }

    pub fn subject_occurrences(&self) -> &[&'a SeedOccurrence] {
        &self.subject
    }

    pub fn query_occurrences(&self) -> &[&'a SeedOccurrence] {
        &self.query
    }

    pub(crate) fn push_subject(&mut self, occ: &'a SeedOccurrence, window: &[u8]) {
        self.subject.push(occ);
        self.subject_windows.extend_from_slice(window);
    }

    pub(crate) fn push_query(&mut self, occ: &'a SeedOccurrence, window: &[u8]) {
        self.query.push(occ);
        self.query_windows.extend_from_slice(window);
    }

    fn window_width(&self) -> usize {
        self.neighborhood.map_or(0, |n| n.width())
    }

    /// Packed neighborhood of subject occurrence `i` (empty without a
    /// neighborhood).
    #[inline]
    pub fn subject_window(&self, i: usize) -> &[u8] {
        let w = self.window_width();
        &self.subject_windows[i * w..(i + 1) * w]
    }

    #[inline]
    pub fn query_window(&self, i: usize) -> &[u8] {
        let w = self.window_width();
        &self.query_windows[i * w..(i + 1) * w]
    }

    /// Number of surviving candidates.
    pub fn candidate_count(&self) -> usize {
        if self.explicit {
            self.pairs.len()
        } else {
            self.subject.len() * self.query.len()
        }
    }

    /// Surviving candidates, subject-major for the implicit cross product.
    pub fn candidate_pairs(&self) -> CandidatePairs<'_, 'a> {
        CandidatePairs {
            hit: self,
            cursor: PairCursor::default(),
            index: 0,
        }
    }

    /// Replace the implicit cross product by an explicit batch.
    pub(crate) fn begin_batch(&mut self) {
        self.pairs.clear();
        self.explicit = true;
    }

    /// The occurrences a candidate refers to, `(subject, query)`.
    #[inline]
    pub fn occurrences_of(&self, pair: CandidatePair) -> (&'a SeedOccurrence, &'a SeedOccurrence) {
        (self.subject[pair.subject as usize], self.query[pair.query as usize])
    }

    /// Candidates as `(subject offset, query offset)` in database coordinates.
    pub fn database_offsets(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.candidate_pairs().map(move |p| {
            let (s, q) = self.occurrences_of(p);
            (s.offset_in_database, q.offset_in_database)
        })
    }
}

/// Iterator over a Hit's candidates.
pub struct CandidatePairs<'h, 'a> {
    hit: &'h Hit<'a>,
    cursor: PairCursor,
    index: usize,
}

impl Iterator for CandidatePairs<'_, '_> {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<CandidatePair> {
        if self.hit.explicit {
            let pair = self.hit.pairs.get(self.index).copied();
            self.index += 1;
            return pair;
        }
        if self.hit.query.is_empty() || self.cursor.subject >= self.hit.subject.len() {
            return None;
        }
        let pair = CandidatePair {
            subject: self.cursor.subject as u32,
            query: self.cursor.query as u32,
        };
        self.cursor.query += 1;
        if self.cursor.query == self.hit.query.len() {
            self.cursor.query = 0;
            self.cursor.subject += 1;
        }
        Some(pair)
    }
}
