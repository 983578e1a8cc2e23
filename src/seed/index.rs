//! Seed index: seed code -> ordered occurrence list for one collection.
//!
//! The index is built in two passes per partition of the collection. Pass 1
//! counts occurrences per code, the counts are turned into exact offsets, and
//! pass 2 writes every occurrence into its slot. Partitions are built in
//! parallel (one dispatcher command each) and merged into a [`SeedIndex`]
//! whose per-code totals make `occurrence_count` O(1).
//!
//! Once built, the index is read-only and shared without locking.

use std::ops::Range;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::sequence::{fill_neighborhood, SequenceDatabase};

use super::model::{SeedCode, SeedModel};

/// One position of a seed inside the indexed collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeedOccurrence {
    pub sequence: u32,
    pub offset_in_sequence: u32,
    pub offset_in_database: u64,
}

/// Window packed around a seed anchor: `left` residues before it and
/// `right` residues starting at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    pub left: usize,
    pub right: usize,
}

impl Neighborhood {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    /// Symmetric window of `length` residues on each side of the anchor.
    pub fn symmetric(length: usize) -> Self {
        Self::new(length, length)
    }

    pub fn width(&self) -> usize {
        self.left + self.right
    }
}

/// Index over a contiguous range of sequences.
#[derive(Debug, Clone, Default)]
pub struct PartialIndex {
    sequences: Range<usize>,
    /// offsets[c]..offsets[c + 1] is the slice of occurrences for code c
    offsets: Vec<usize>,
    occurrences: Vec<SeedOccurrence>,
}

impl PartialIndex {
    pub fn build(database: &SequenceDatabase, sequences: Range<usize>, model: &SeedModel) -> Self {
        let code_count = model.code_count();

        // Pass 1: count
        let mut offsets = vec![0usize; code_count + 1];
        for i in sequences.clone() {
            for (_, code) in model.scan(database.data(i)) {
                offsets[code as usize + 1] += 1;
            }
        }
        for c in 0..code_count {
            offsets[c + 1] += offsets[c];
        }

        // Pass 2: fill
        let total = offsets[code_count];
        let mut occurrences = vec![SeedOccurrence::default(); total];
        let mut cursor = offsets[..code_count].to_vec();
        for i in sequences.clone() {
            let Some(seq) = database.sequence(i) else {
                continue;
            };
            for (pos, code) in model.scan(seq.data) {
                let slot = &mut cursor[code as usize];
                occurrences[*slot] = SeedOccurrence {
                    sequence: i as u32,
                    offset_in_sequence: pos as u32,
                    offset_in_database: (seq.offset_in_database + pos) as u64,
                };
                *slot += 1;
            }
        }

        Self {
            sequences,
            offsets,
            occurrences,
        }
    }

    pub fn sequences(&self) -> &Range<usize> {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    #[inline]
    fn bounds(&self, code: usize) -> (usize, usize) {
        match (self.offsets.get(code), self.offsets.get(code + 1)) {
            (Some(&a), Some(&b)) => (a, b),
            _ => (0, 0),
        }
    }

    #[inline]
    pub fn slice(&self, code: SeedCode) -> &[SeedOccurrence] {
        let (a, b) = self.bounds(code as usize);
        &self.occurrences[a..b]
    }
}

/// Seed index for one sequence collection.
#[derive(Debug)]
pub struct SeedIndex {
    database: Arc<SequenceDatabase>,
    model: SeedModel,
    parts: Vec<PartialIndex>,
    totals: Vec<u32>,
    total_occurrences: usize,
}

impl SeedIndex {
    /// Index every sequence of `database`.
    pub fn build(database: Arc<SequenceDatabase>, model: SeedModel, dispatcher: &Dispatcher) -> Self {
        let range = 0..database.len();
        Self::build_range(database, range, model, dispatcher)
    }

    /// Index the sequences in `range`, one partition per worker.
    pub fn build_range(
        database: Arc<SequenceDatabase>,
        range: Range<usize>,
        model: SeedModel,
        dispatcher: &Dispatcher,
    ) -> Self {
        let partitions = database.split_range(range, dispatcher.workers());
        let parts = {
            let db: &SequenceDatabase = &database;
            let model = &model;
            let jobs: Vec<_> = partitions
                .into_iter()
                .map(|r| move || PartialIndex::build(db, r, model))
                .collect();
            dispatcher.dispatch_collect(jobs)
        };
        Self::merge(database, model, parts)
    }

    /// Combine partial indices built over disjoint, ordered sequence ranges.
    pub fn merge(database: Arc<SequenceDatabase>, model: SeedModel, mut parts: Vec<PartialIndex>) -> Self {
        parts.sort_by_key(|p| p.sequences.start);
        let code_count = model.code_count();
        let mut totals = vec![0u32; code_count];
        for part in &parts {
            for (c, total) in totals.iter_mut().enumerate() {
                let (a, b) = part.bounds(c);
                *total = total.saturating_add((b - a) as u32);
            }
        }
        let total_occurrences = parts.iter().map(PartialIndex::len).sum();
        log::debug!(
            "seed index merged: {} partitions, {} occurrences",
            parts.len(),
            total_occurrences
        );
        Self {
            database,
            model,
            parts,
            totals,
            total_occurrences,
        }
    }

    pub fn database(&self) -> &SequenceDatabase {
        &self.database
    }

    pub fn model(&self) -> &SeedModel {
        &self.model
    }

    pub fn partitions(&self) -> &[PartialIndex] {
        &self.parts
    }

    pub fn total_occurrences(&self) -> usize {
        self.total_occurrences
    }

    /// Occurrences of `code`; zero for a code outside the model range.
    #[inline]
    pub fn occurrence_count(&self, code: SeedCode) -> usize {
        self.totals.get(code as usize).copied().unwrap_or(0) as usize
    }

    /// All occurrences of `code` in database order.
    pub fn occurrences(&self, code: SeedCode) -> OccurrenceIter<'_> {
        self.occurrence_iterator(code, None, usize::MAX)
    }

    /// Lazy iteration over at most `max_count` occurrences of `code`,
    /// optionally packing a neighborhood for each one.
    pub fn occurrence_iterator(
        &self,
        code: SeedCode,
        neighborhood: Option<Neighborhood>,
        max_count: usize,
    ) -> OccurrenceIter<'_> {
        let valid = (code as usize) < self.model.code_count();
        let (pos, end) = match self.parts.first() {
            Some(p) if valid => p.bounds(code as usize),
            _ => (0, 0),
        };
        OccurrenceIter {
            index: self,
            code: code as usize,
            part: if valid { 0 } else { self.parts.len() },
            pos,
            end,
            remaining: max_count,
            neighborhood,
            buffer: vec![0u8; neighborhood.map_or(0, |n| n.width())],
        }
    }

    /// Pack the neighborhood of `occ` into `out`.
    #[inline]
    pub fn fill_neighborhood(&self, occ: &SeedOccurrence, neighborhood: Neighborhood, out: &mut [u8]) {
        fill_neighborhood(
            self.database.data(occ.sequence as usize),
            occ.offset_in_sequence as usize,
            neighborhood.left,
            neighborhood.right,
            out,
        );
    }
}

/// Lazy occurrence sequence for one seed code, chaining the partitions.
///
/// Finite and not restartable. Distinct iterators over the same index may be
/// used from different threads.
pub struct OccurrenceIter<'a> {
    index: &'a SeedIndex,
    code: usize,
    part: usize,
    pos: usize,
    end: usize,
    remaining: usize,
    neighborhood: Option<Neighborhood>,
    buffer: Vec<u8>,
}

impl<'a> OccurrenceIter<'a> {
    /// Next occurrence together with its packed neighborhood. The window is
    /// empty when the iterator was created without a neighborhood.
    pub fn next_with_neighborhood(&mut self) -> Option<(&'a SeedOccurrence, &[u8])> {
        let occ = self.advance()?;
        if let Some(nb) = self.neighborhood {
            self.index.fill_neighborhood(occ, nb, &mut self.buffer);
        }
        Some((occ, self.buffer.as_slice()))
    }

    #[inline]
    fn advance(&mut self) -> Option<&'a SeedOccurrence> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if self.pos < self.end {
                let part = &self.index.parts[self.part];
                let occ = &part.occurrences[self.pos];
                self.pos += 1;
                self.remaining -= 1;
                return Some(occ);
            }
            self.part += 1;
            let part = self.index.parts.get(self.part)?;
            let (a, b) = part.bounds(self.code);
            self.pos = a;
            self.end = b;
        }
    }
}

impl<'a> Iterator for OccurrenceIter<'a> {
    type Item = &'a SeedOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::matrix::{encode_sequence, SENTINEL};

    fn index_of(seqs: &[&str], workers: usize) -> SeedIndex {
        let db = Arc::new(SequenceDatabase::from_strings(seqs.iter().copied()));
        let model = SeedModel::new(3, 20).unwrap();
        let dispatcher = Dispatcher::new(workers).unwrap();
        SeedIndex::build(db, model, &dispatcher)
    }

    #[test]
    fn test_counts_and_order() {
        let index = index_of(&["AADAAD", "CAAD"], 2);
        let code = index.model().hash(&encode_sequence(b"AAD")).unwrap();
        assert_eq!(index.occurrence_count(code), 3);
        let offsets: Vec<_> = index.occurrences(code).map(|o| o.offset_in_database).collect();
        assert_eq!(offsets, vec![0, 3, 7]);
        let seqs: Vec<_> = index.occurrences(code).map(|o| (o.sequence, o.offset_in_sequence)).collect();
        assert_eq!(seqs, vec![(0, 0), (0, 3), (1, 1)]);
    }

    #[test]
    fn test_partitioning_does_not_change_contents() {
        let seqs = ["MKVLAAGHW", "AAGHWKV", "PPPPAAG", "WKVLAAG", "GHWKV"];
        let single = index_of(&seqs, 1);
        let multi = index_of(&seqs, 4);
        assert!(multi.partitions().len() > 1);
        assert_eq!(single.total_occurrences(), multi.total_occurrences());
        for code in 0..single.model().code_count() as SeedCode {
            let a: Vec<_> = single.occurrences(code).copied().collect();
            let b: Vec<_> = multi.occurrences(code).copied().collect();
            assert_eq!(a, b);
            assert_eq!(single.occurrence_count(code), a.len());
        }
    }

    #[test]
    fn test_out_of_range_code_is_empty() {
        let index = index_of(&["AADDPP"], 1);
        assert_eq!(index.occurrence_count(8000), 0);
        assert_eq!(index.occurrences(u32::MAX).count(), 0);
    }

    #[test]
    fn test_max_count_and_neighborhood() {
        let index = index_of(&["AADAAD", "CAAD"], 1);
        let code = index.model().hash(&encode_sequence(b"AAD")).unwrap();
        assert_eq!(index.occurrence_iterator(code, None, 2).count(), 2);

        let mut it = index.occurrence_iterator(code, Some(Neighborhood::new(2, 4)), usize::MAX);
        let (occ, window) = it.next_with_neighborhood().unwrap();
        assert_eq!(occ.offset_in_database, 0);
        let mut expected = vec![SENTINEL, SENTINEL];
        expected.extend(encode_sequence(b"AADA"));
        assert_eq!(window, expected.as_slice());
    }
}
