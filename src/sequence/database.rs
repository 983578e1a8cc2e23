use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use bio::io::fasta;

use crate::utils::matrix::{encode_residue, encode_sequence, SENTINEL};

/// One sequence of a [`SequenceDatabase`], borrowed.
#[derive(Debug, Clone, Copy)]
pub struct Sequence<'a> {
    pub index: u32,
    pub id: &'a str,
    /// Offset of the first residue within the database concatenation
    pub offset_in_database: usize,
    pub data: &'a [u8],
}

impl<'a> Sequence<'a> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encoded residues of a sequence collection, concatenated.
#[derive(Debug, Clone)]
pub struct SequenceDatabase {
    ids: Vec<String>,
    residues: Vec<u8>,
    /// starts[i] is the offset of sequence i; starts has len() + 1 entries
    starts: Vec<usize>,
}

impl SequenceDatabase {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            residues: Vec::new(),
            starts: vec![0],
        }
    }

    /// Append an already-encoded sequence.
    pub fn push(&mut self, id: impl Into<String>, encoded: &[u8]) {
        self.ids.push(id.into());
        self.residues.extend_from_slice(encoded);
        self.starts.push(self.residues.len());
    }

    /// Append an ASCII sequence, encoding it on the way in.
    pub fn push_ascii(&mut self, id: impl Into<String>, ascii: &[u8]) {
        self.ids.push(id.into());
        self.residues.extend(
            ascii
                .iter()
                .filter(|c| !c.is_ascii_whitespace())
                .map(|&c| encode_residue(c)),
        );
        self.starts.push(self.residues.len());
    }

    /// Build a collection from plain strings; ids are `seq0`, `seq1`, ...
    pub fn from_strings<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut db = Self::new();
        for (i, s) in sequences.into_iter().enumerate() {
            db.push(format!("seq{}", i), &encode_sequence(s.as_ref().as_bytes()));
        }
        db
    }

    /// Load a protein FASTA file.
    pub fn from_fasta<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let reader = fasta::Reader::from_file(&path)
            .with_context(|| format!("Failed to open FASTA file {:?}", path))?;
        let mut db = Self::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Malformed FASTA record in {:?}", path))?;
            db.push_ascii(record.id(), record.seq());
        }
        Ok(db)
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn total_residues(&self) -> usize {
        self.residues.len()
    }

    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn sequence_len(&self, index: usize) -> usize {
        match (self.starts.get(index), self.starts.get(index + 1)) {
            (Some(&a), Some(&b)) => b - a,
            _ => 0,
        }
    }

    pub fn sequence(&self, index: usize) -> Option<Sequence<'_>> {
        let start = *self.starts.get(index)?;
        let end = *self.starts.get(index + 1)?;
        Some(Sequence {
            index: index as u32,
            id: &self.ids[index],
            offset_in_database: start,
            data: &self.residues[start..end],
        })
    }

    /// Encoded residues of sequence `index`; empty when out of range.
    #[inline]
    pub fn data(&self, index: usize) -> &[u8] {
        match (self.starts.get(index), self.starts.get(index + 1)) {
            (Some(&a), Some(&b)) => &self.residues[a..b],
            _ => &[],
        }
    }

    /// Map a database offset to (sequence index, offset in sequence).
    pub fn sequence_at(&self, offset_in_database: usize) -> Option<(u32, usize)> {
        if offset_in_database >= self.residues.len() {
            return None;
        }
        // Last start <= offset; empty sequences share a start with their successor.
        let idx = self.starts.partition_point(|&s| s <= offset_in_database) - 1;
        Some((idx as u32, offset_in_database - self.starts[idx]))
    }

    pub fn iter(&self) -> impl Iterator<Item = Sequence<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.sequence(i))
    }

    /// Split the sequence indices into at most `n` disjoint contiguous ranges
    /// with roughly equal residue counts.
    pub fn split(&self, n: usize) -> Vec<Range<usize>> {
        self.split_range(0..self.len(), n)
    }

    /// Same as [`SequenceDatabase::split`], restricted to `range`.
    pub fn split_range(&self, range: Range<usize>, n: usize) -> Vec<Range<usize>> {
        let end = range.end.min(self.len());
        let begin = range.start.min(end);
        let count = end - begin;
        if count == 0 {
            return vec![begin..begin];
        }
        let n = n.clamp(1, count);
        let base = self.starts[begin];
        let total = (self.starts[end] - base).max(1);
        let mut ranges = Vec::with_capacity(n);
        let mut first = begin;
        for part in 1..=n {
            if first >= end {
                break;
            }
            let last = if part == n {
                end
            } else {
                let target = base + total * part / n;
                self.starts[..end]
                    .partition_point(|&s| s < target)
                    .clamp(first + 1, end)
            };
            ranges.push(first..last);
            first = last;
        }
        ranges
    }

    /// Consecutive sequence ranges each holding at most `max_residues`
    /// residues. A sequence larger than the limit forms its own block.
    pub fn blocks(&self, max_residues: usize) -> Vec<Range<usize>> {
        let count = self.len();
        if max_residues == 0 || self.total_residues() <= max_residues {
            return vec![0..count];
        }
        let mut blocks = Vec::new();
        let mut first = 0;
        let mut size = 0;
        for i in 0..count {
            let len = self.sequence_len(i);
            if i > first && size + len > max_residues {
                blocks.push(first..i);
                first = i;
                size = 0;
            }
            size += len;
        }
        blocks.push(first..count);
        blocks
    }

    /// Residue count of a range of sequences.
    pub fn range_residues(&self, range: &Range<usize>) -> usize {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.starts[end] - self.starts[start]
    }
}

impl Default for SequenceDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `data[anchor - left .. anchor + right]` into `out`, padding positions
/// outside the sequence with [`SENTINEL`]. `out` must hold `left + right` bytes.
#[inline]
pub fn fill_neighborhood(data: &[u8], anchor: usize, left: usize, right: usize, out: &mut [u8]) {
    let width = left + right;
    debug_assert!(out.len() >= width);
    let start = anchor as isize - left as isize;
    for (k, slot) in out[..width].iter_mut().enumerate() {
        let pos = start + k as isize;
        *slot = if pos >= 0 && (pos as usize) < data.len() {
            data[pos as usize]
        } else {
            SENTINEL
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenated_offsets() {
        let db = SequenceDatabase::from_strings(["AADDPP", "CCFFF"]);
        assert_eq!(db.len(), 2);
        assert_eq!(db.total_residues(), 11);
        let s1 = db.sequence(1).unwrap();
        assert_eq!(s1.offset_in_database, 6);
        assert_eq!(s1.len(), 5);
        assert_eq!(db.sequence_at(7), Some((1, 1)));
        assert_eq!(db.sequence_at(0), Some((0, 0)));
        assert_eq!(db.sequence_at(11), None);
    }

    #[test]
    fn test_sequence_at_skips_empty_sequences() {
        let db = SequenceDatabase::from_strings(["AC", "", "DE"]);
        assert_eq!(db.sequence_at(2), Some((2, 0)));
    }

    #[test]
    fn test_split_covers_all_sequences() {
        let db = SequenceDatabase::from_strings(["AAAA", "CC", "DDDDDD", "E", "FFF"]);
        for n in 1..7 {
            let parts = db.split(n);
            assert!(parts.len() <= n);
            assert_eq!(parts.first().unwrap().start, 0);
            assert_eq!(parts.last().unwrap().end, db.len());
            for w in parts.windows(2) {
                assert_eq!(w[0].end, w[1].start);
                assert!(w[0].start < w[0].end);
            }
        }
    }

    #[test]
    fn test_blocks_respect_limit() {
        let db = SequenceDatabase::from_strings(["AAAA", "CC", "DDDDDDDDDD", "E"]);
        let blocks = db.blocks(6);
        assert_eq!(blocks, vec![0..2, 2..3, 3..4]);
        assert_eq!(db.blocks(0), vec![0..4]);
    }

    #[test]
    fn test_fill_neighborhood_pads_with_sentinel() {
        let data = [1u8, 2, 3];
        let mut out = [0u8; 6];
        fill_neighborhood(&data, 1, 2, 4, &mut out);
        assert_eq!(out, [SENTINEL, 1, 2, 3, SENTINEL, SENTINEL]);
    }
}
