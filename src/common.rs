use std::cmp::Ordering;

use crate::align::AlignmentStats;

/// A reported local alignment (HSP) between one query and one subject.
///
/// Coordinates are 0-based and inclusive, relative to each sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub query: u32,
    pub subject: u32,
    pub q_start: usize,
    pub q_end: usize,
    pub s_start: usize,
    pub s_end: usize,
    /// Raw alignment score
    pub score: i32,
    pub bit_score: f64,
    pub evalue: f64,
    pub stats: AlignmentStats,
    /// Query row with gap symbols, kept on request
    pub query_aligned: Option<String>,
    /// Subject row with gap symbols, kept on request
    pub subject_aligned: Option<String>,
}

impl Alignment {
    pub fn query_span(&self) -> usize {
        self.q_end + 1 - self.q_start
    }

    pub fn subject_span(&self) -> usize {
        self.s_end + 1 - self.s_start
    }

    /// Longer of the two spans
    pub fn span(&self) -> usize {
        self.query_span().max(self.subject_span())
    }

    /// Both ranges identical
    pub fn same_range(&self, other: &Alignment) -> bool {
        self.q_start == other.q_start
            && self.q_end == other.q_end
            && self.s_start == other.s_start
            && self.s_end == other.s_end
    }

    /// Diagonals at the start and end of the alignment, ordered.
    pub fn diagonal_range(&self) -> (i64, i64) {
        let a = self.q_start as i64 - self.s_start as i64;
        let b = self.q_end as i64 - self.s_end as i64;
        (a.min(b), a.max(b))
    }

    /// True when `(q_offset, s_offset)` lies inside both ranges and within
    /// `band` diagonals of the alignment's diagonal range.
    pub fn covers(&self, q_offset: usize, s_offset: usize, band: usize) -> bool {
        if q_offset < self.q_start || q_offset > self.q_end || s_offset < self.s_start || s_offset > self.s_end {
            return false;
        }
        let diagonal = q_offset as i64 - s_offset as i64;
        let (lo, hi) = self.diagonal_range();
        diagonal >= lo - band as i64 && diagonal <= hi + band as i64
    }

    /// True when `self` contains `other` on both sequences, allowing each
    /// boundary to stick out by `tolerance` residues.
    pub fn contains(&self, other: &Alignment, tolerance: usize) -> bool {
        other.q_start + tolerance >= self.q_start
            && other.q_end <= self.q_end + tolerance
            && other.s_start + tolerance >= self.s_start
            && other.s_end <= self.s_end + tolerance
    }

    /// Fraction of `self`'s query and subject ranges covered by `other`,
    /// the smaller of the two.
    pub fn overlap_fraction(&self, other: &Alignment) -> f64 {
        fn overlap(a0: usize, a1: usize, b0: usize, b1: usize) -> usize {
            let lo = a0.max(b0);
            let hi = a1.min(b1);
            if hi >= lo {
                hi - lo + 1
            } else {
                0
            }
        }
        let q = overlap(self.q_start, self.q_end, other.q_start, other.q_end) as f64 / self.query_span() as f64;
        let s = overlap(self.s_start, self.s_end, other.s_start, other.s_end) as f64 / self.subject_span() as f64;
        q.min(s)
    }
}

/// Compare two evalues, treating both as equal if they're close enough to zero.
#[inline]
pub fn evalue_comp(evalue1: f64, evalue2: f64) -> Ordering {
    const EPSILON: f64 = 1.0e-180;
    if evalue1 < EPSILON && evalue2 < EPSILON {
        Ordering::Equal
    } else if evalue1 < evalue2 {
        Ordering::Less
    } else if evalue1 > evalue2 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Total order on alignments of one (query, subject) bucket.
///
/// Order: evalue ASC → bit score DESC → q_start ASC → s_start ASC → q_end ASC → s_end ASC
pub fn compare_alignments(a: &Alignment, b: &Alignment) -> Ordering {
    evalue_comp(a.evalue, b.evalue)
        .then_with(|| b.bit_score.partial_cmp(&a.bit_score).unwrap_or(Ordering::Equal))
        .then_with(|| a.q_start.cmp(&b.q_start))
        .then_with(|| a.s_start.cmp(&b.s_start))
        .then_with(|| a.q_end.cmp(&b.q_end))
        .then_with(|| a.s_end.cmp(&b.s_end))
}

#[cfg(test)]
pub(crate) fn test_alignment(
    query: u32,
    subject: u32,
    (q_start, q_end): (usize, usize),
    (s_start, s_end): (usize, usize),
    score: i32,
) -> Alignment {
    Alignment {
        query,
        subject,
        q_start,
        q_end,
        s_start,
        s_end,
        score,
        bit_score: score as f64 / 2.0,
        evalue: 1.0 / (score.max(1) as f64),
        stats: AlignmentStats::default(),
        query_aligned: None,
        subject_aligned: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment_with_tolerance() {
        let long = test_alignment(0, 0, (10, 100), (20, 110), 90);
        let inner = test_alignment(0, 0, (8, 60), (18, 70), 40);
        assert!(!long.contains(&inner, 0));
        assert!(long.contains(&inner, 2));
        assert!(!inner.contains(&long, 2));
    }

    #[test]
    fn test_covers_checks_diagonal() {
        let aln = test_alignment(0, 0, (10, 50), (10, 50), 60);
        assert!(aln.covers(30, 30, 0));
        assert!(!aln.covers(30, 25, 2));
        assert!(aln.covers(30, 25, 5));
        assert!(!aln.covers(60, 60, 5));
    }

    #[test]
    fn test_sort_order() {
        let strong = test_alignment(0, 0, (0, 10), (0, 10), 80);
        let weak = test_alignment(0, 0, (0, 10), (0, 10), 20);
        assert_eq!(compare_alignments(&strong, &weak), Ordering::Less);
        let tied = Alignment { q_start: 5, ..strong.clone() };
        assert_eq!(compare_alignments(&strong, &tied), Ordering::Less);
        assert_eq!(evalue_comp(1e-200, 1e-190), Ordering::Equal);
    }
}
