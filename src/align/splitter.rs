//! Exact banded affine-gap alignment of an already-bounded alignment.
//!
//! Fills a Gotoh three-state DP (best, gap in query, gap in subject) over a
//! diagonal band derived from the skew of the bounds, then tracebacks to get
//! identity, gap and length figures. At ties the diagonal move wins over a
//! gap, and extending an open gap wins over opening a new one.

use crate::error::AlignError;
use crate::utils::matrix::ScoreMatrix;

use super::result::{aligned_strings, AlignmentStats, EditOp};
use super::traceback::{
    BandedTrace, FROM_DIAG, FROM_QUERY_GAP, FROM_SUBJECT_GAP, QUERY_GAP_EXTENDS, SUBJECT_GAP_EXTENDS,
};
use super::GapCosts;

const NEG_INF: i32 = i32::MIN / 2;

/// Output of [`AlignmentSplitter::split`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAlignment {
    pub score: i32,
    pub stats: AlignmentStats,
    pub ops: Vec<EditOp>,
    /// Query and subject rows with gap symbols, when requested
    pub aligned: Option<(String, String)>,
}

/// Banded global aligner with reusable DP storage.
#[derive(Debug)]
pub struct AlignmentSplitter {
    max_span: usize,
    margin: usize,
    trace: BandedTrace,
    h_prev: Vec<i32>,
    h_cur: Vec<i32>,
    f_prev: Vec<i32>,
    f_cur: Vec<i32>,
}

impl AlignmentSplitter {
    /// `max_span` caps either side; `margin` widens the band beyond the skew.
    pub fn new(max_span: usize, margin: usize) -> Self {
        Self {
            max_span,
            margin,
            trace: BandedTrace::new(),
            h_prev: Vec::new(),
            h_cur: Vec::new(),
            f_prev: Vec::new(),
            f_cur: Vec::new(),
        }
    }

    pub fn max_span(&self) -> usize {
        self.max_span
    }

    fn ensure_rows(&mut self, width: usize) {
        for row in [&mut self.h_prev, &mut self.h_cur, &mut self.f_prev, &mut self.f_cur] {
            if row.len() < width {
                let target = width.max(row.len() * 2);
                row.resize(target, NEG_INF);
            }
        }
    }

    /// Align `query` end to end against `subject`.
    pub fn split(
        &mut self,
        query: &[u8],
        subject: &[u8],
        matrix: &ScoreMatrix,
        gaps: GapCosts,
        with_strings: bool,
    ) -> Result<SplitAlignment, AlignError> {
        let (m, n) = (query.len(), subject.len());
        if m > self.max_span || n > self.max_span {
            return Err(AlignError::CapacityExceeded {
                query_span: m,
                subject_span: n,
                max_span: self.max_span,
            });
        }

        let skew = n as isize - m as isize;
        let margin = self.margin as isize;
        let lo = skew.min(0) - margin;
        let hi = skew.max(0) + margin;
        let width = (hi - lo + 1) as usize;
        let gap_oe = gaps.open + gaps.extend;
        let gap_e = gaps.extend;

        self.ensure_rows(width);
        self.trace.reset(m + 1, width, lo);

        for i in 0..=m {
            // Horizontal state runs along the row
            let mut e = NEG_INF;
            let mut h_left = NEG_INF;
            for k in 0..width {
                let j = i as isize + lo + k as isize;
                if j < 0 || j > n as isize {
                    self.h_cur[k] = NEG_INF;
                    self.f_cur[k] = NEG_INF;
                    e = NEG_INF;
                    h_left = NEG_INF;
                    continue;
                }
                let j = j as usize;
                if i == 0 && j == 0 {
                    self.h_cur[k] = 0;
                    self.f_cur[k] = NEG_INF;
                    e = NEG_INF;
                    h_left = 0;
                    self.trace.set(i, k, FROM_DIAG);
                    continue;
                }

                let e_open = h_left - gap_oe;
                let e_ext = e - gap_e;
                let (e_new, e_extends) = if e_ext >= e_open { (e_ext, true) } else { (e_open, false) };

                let (up_h, up_f) = if i > 0 && k + 1 < width {
                    (self.h_prev[k + 1], self.f_prev[k + 1])
                } else {
                    (NEG_INF, NEG_INF)
                };
                let f_open = up_h - gap_oe;
                let f_ext = up_f - gap_e;
                let (f_new, f_extends) = if f_ext >= f_open { (f_ext, true) } else { (f_open, false) };

                let diag = if i > 0 && j > 0 {
                    self.h_prev[k] + matrix.score(query[i - 1], subject[j - 1])
                } else {
                    NEG_INF
                };

                let (h, source) = if diag >= e_new && diag >= f_new {
                    (diag, FROM_DIAG)
                } else if e_new >= f_new {
                    (e_new, FROM_QUERY_GAP)
                } else {
                    (f_new, FROM_SUBJECT_GAP)
                };
                let mut bits = source;
                if e_extends {
                    bits |= QUERY_GAP_EXTENDS;
                }
                if f_extends {
                    bits |= SUBJECT_GAP_EXTENDS;
                }
                self.trace.set(i, k, bits);

                self.h_cur[k] = h;
                self.f_cur[k] = f_new;
                e = e_new;
                h_left = h;
            }
            std::mem::swap(&mut self.h_prev, &mut self.h_cur);
            std::mem::swap(&mut self.f_prev, &mut self.f_cur);
        }

        let end_cell = (skew - lo) as usize;
        let score = self.h_prev[end_cell];
        let ops = self
            .trace
            .traceback(m, n, query, subject)
            .ok_or(AlignError::CapacityExceeded {
                query_span: m,
                subject_span: n,
                max_span: self.max_span,
            })?;
        let stats = AlignmentStats::from_edit_script(&ops, query, subject, matrix);
        let aligned = with_strings.then(|| aligned_strings(&ops, query, subject));
        Ok(SplitAlignment {
            score,
            stats,
            ops,
            aligned,
        })
    }
}
