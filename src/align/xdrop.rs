//! X-drop bounded affine-gap extension, score only.
//!
//! Each direction aligns prefixes of two sequences starting at a fixed
//! origin. Rows are swept over a dynamic column window: cells scoring more
//! than `x_drop` below the best score seen so far are pruned, and the window
//! for the next row is trimmed to the surviving cells. Extension stops when a
//! row has no surviving cell.
//!
//! The pruning floor follows the best score, so a single extension is not
//! monotone in `x_drop`: a larger X can reach a higher early peak whose floor
//! then cuts a path a smaller X kept. [`XDropAligner::widen`] and
//! [`XDropAligner::extend_ladder`] keep the better side of every X tried,
//! which is monotone in the set of X values.

use crate::utils::matrix::ScoreMatrix;

use super::GapCosts;

const NEG_INF: i32 = i32::MIN / 2;

/// Best prefix alignment found by one directional extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XDropExtension {
    pub score: i32,
    /// Residues of the first sequence consumed
    pub query_len: usize,
    /// Residues of the second sequence consumed
    pub subject_len: usize,
}

/// Two-sided extension around an anchor pair, 0-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GappedExtension {
    pub score: i32,
    pub q_start: usize,
    pub q_end: usize,
    pub s_start: usize,
    pub s_end: usize,
    /// Leftward part, including the anchor pair
    pub left: XDropExtension,
    /// Rightward part, starting after the anchor pair
    pub right: XDropExtension,
}

impl GappedExtension {
    fn assemble(q_anchor: usize, s_anchor: usize, left: XDropExtension, right: XDropExtension) -> Option<Self> {
        let score = left.score + right.score;
        if score <= 0 || left.query_len + right.query_len == 0 || left.subject_len + right.subject_len == 0 {
            return None;
        }
        Some(Self {
            score,
            q_start: q_anchor + 1 - left.query_len,
            q_end: q_anchor + right.query_len,
            s_start: s_anchor + 1 - left.subject_len,
            s_end: s_anchor + right.subject_len,
            left,
            right,
        })
    }
}

/// Residues read forward from the start of a slice, or backward from its end.
#[derive(Debug, Clone, Copy)]
struct Strand<'s> {
    seq: &'s [u8],
    reverse: bool,
}

impl<'s> Strand<'s> {
    fn forward(seq: &'s [u8]) -> Self {
        Self { seq, reverse: false }
    }

    fn backward(seq: &'s [u8]) -> Self {
        Self { seq, reverse: true }
    }

    #[inline]
    fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline(always)]
    fn at(&self, k: usize) -> u8 {
        if self.reverse {
            self.seq[self.seq.len() - 1 - k]
        } else {
            self.seq[k]
        }
    }
}

#[derive(Debug, Default)]
struct DpRows {
    h_prev: Vec<i32>,
    e_prev: Vec<i32>,
    h_cur: Vec<i32>,
    e_cur: Vec<i32>,
}

impl DpRows {
    fn ensure(&mut self, cols: usize) {
        for row in [&mut self.h_prev, &mut self.e_prev, &mut self.h_cur, &mut self.e_cur] {
            if row.len() < cols {
                let target = cols.max(row.len() * 2);
                row.resize(target, NEG_INF);
            }
        }
    }

    fn extend(&mut self, a: Strand<'_>, b: Strand<'_>, matrix: &ScoreMatrix, gaps: GapCosts, x_drop: i32) -> XDropExtension {
        let n = b.len();
        self.ensure(n + 1);
        let gap_oe = gaps.open + gaps.extend;
        let gap_e = gaps.extend;

        // Row 0: leading gap in the first sequence
        self.h_prev[0] = 0;
        self.e_prev[0] = NEG_INF;
        let mut end = 1;
        while end <= n {
            let s = -(gaps.open + gaps.extend * end as i32);
            if s < -x_drop {
                break;
            }
            self.h_prev[end] = s;
            self.e_prev[end] = NEG_INF;
            end += 1;
        }
        let mut first = 0;

        let mut best = XDropExtension::default();
        for i in 1..=a.len() {
            let ai = a.at(i - 1);
            let floor = best.score - x_drop;
            let mut f = NEG_INF;
            let mut new_first = None;
            let mut new_last = 0;
            let mut j = first;
            while j <= n {
                let diag = if j > first && j - 1 < end {
                    self.h_prev[j - 1] + matrix.score(ai, b.at(j - 1))
                } else {
                    NEG_INF
                };
                let (up_h, up_e) = if j < end {
                    (self.h_prev[j], self.e_prev[j])
                } else {
                    (NEG_INF, NEG_INF)
                };
                let mut e = (up_h - gap_oe).max(up_e - gap_e);
                let mut h = diag.max(e).max(f);
                if h < floor {
                    h = NEG_INF;
                    e = NEG_INF;
                } else {
                    new_first.get_or_insert(j);
                    new_last = j;
                    if h > best.score {
                        best = XDropExtension {
                            score: h,
                            query_len: i,
                            subject_len: j,
                        };
                    }
                }
                self.h_cur[j] = h;
                self.e_cur[j] = e;
                f = (h - gap_oe).max(f - gap_e);
                j += 1;
                // Past the previous window only the horizontal gap can continue
                if j > end && h == NEG_INF {
                    break;
                }
            }
            let Some(nf) = new_first else {
                break;
            };
            first = nf;
            end = new_last + 1;
            std::mem::swap(&mut self.h_prev, &mut self.h_cur);
            std::mem::swap(&mut self.e_prev, &mut self.e_cur);
        }
        best
    }
}

/// Reusable two-directional X-drop aligner.
#[derive(Debug, Default)]
pub struct XDropAligner {
    rows: DpRows,
}

impl XDropAligner {
    pub fn new() -> Self {
        Self::default()
    }

    fn sides(
        &mut self,
        query: &[u8],
        subject: &[u8],
        q_anchor: usize,
        s_anchor: usize,
        matrix: &ScoreMatrix,
        gaps: GapCosts,
        x_drop: i32,
    ) -> (XDropExtension, XDropExtension) {
        let left = self.rows.extend(
            Strand::backward(&query[..=q_anchor]),
            Strand::backward(&subject[..=s_anchor]),
            matrix,
            gaps,
            x_drop,
        );
        let right = self.rows.extend(
            Strand::forward(&query[q_anchor + 1..]),
            Strand::forward(&subject[s_anchor + 1..]),
            matrix,
            gaps,
            x_drop,
        );
        (left, right)
    }

    /// Extend around `(q_anchor, s_anchor)`: the left extension includes the
    /// anchor pair, the right one starts just after it. Returns `None` when
    /// no positive-scoring alignment exists.
    pub fn extend(
        &mut self,
        query: &[u8],
        subject: &[u8],
        q_anchor: usize,
        s_anchor: usize,
        matrix: &ScoreMatrix,
        gaps: GapCosts,
        x_drop: i32,
    ) -> Option<GappedExtension> {
        if q_anchor >= query.len() || s_anchor >= subject.len() {
            return None;
        }
        let (left, right) = self.sides(query, subject, q_anchor, s_anchor, matrix, gaps, x_drop);
        GappedExtension::assemble(q_anchor, s_anchor, left, right)
    }

    /// Re-extend `previous` (found around the same anchor) with `x_drop`,
    /// keeping on each side whichever of the two extensions scores higher.
    /// The result never scores below `previous`.
    #[allow(clippy::too_many_arguments)]
    pub fn widen(
        &mut self,
        query: &[u8],
        subject: &[u8],
        q_anchor: usize,
        s_anchor: usize,
        previous: &GappedExtension,
        matrix: &ScoreMatrix,
        gaps: GapCosts,
        x_drop: i32,
    ) -> GappedExtension {
        if q_anchor >= query.len() || s_anchor >= subject.len() {
            return *previous;
        }
        let (left, right) = self.sides(query, subject, q_anchor, s_anchor, matrix, gaps, x_drop);
        let left = if left.score > previous.left.score { left } else { previous.left };
        let right = if right.score > previous.right.score { right } else { previous.right };
        GappedExtension::assemble(q_anchor, s_anchor, left, right).unwrap_or(*previous)
    }

    /// Extend once per value of `ladder` and keep the best side of each.
    /// Adding values to the ladder never lowers the score.
    pub fn extend_ladder(
        &mut self,
        query: &[u8],
        subject: &[u8],
        q_anchor: usize,
        s_anchor: usize,
        matrix: &ScoreMatrix,
        gaps: GapCosts,
        ladder: &[i32],
    ) -> Option<GappedExtension> {
        let mut best: Option<GappedExtension> = None;
        for &x_drop in ladder {
            best = match best {
                Some(previous) => Some(self.widen(query, subject, q_anchor, s_anchor, &previous, matrix, gaps, x_drop)),
                None => self.extend(query, subject, q_anchor, s_anchor, matrix, gaps, x_drop),
            };
        }
        best
    }
}

/// Ungapped X-drop extension on the anchor diagonal. Returns the score and
/// the inclusive `(q_start, q_end)` of the best segment; the subject range
/// follows from the diagonal.
pub fn ungapped_xdrop(
    query: &[u8],
    subject: &[u8],
    q_anchor: usize,
    s_anchor: usize,
    matrix: &ScoreMatrix,
    x_drop: i32,
) -> Option<(i32, usize, usize)> {
    if q_anchor >= query.len() || s_anchor >= subject.len() {
        return None;
    }
    // Left, including the anchor
    let mut score = 0;
    let mut best_left = 0;
    let mut left_len = 0;
    let max_left = q_anchor.min(s_anchor) + 1;
    for k in 0..max_left {
        score += matrix.score(query[q_anchor - k], subject[s_anchor - k]);
        if score > best_left {
            best_left = score;
            left_len = k + 1;
        } else if best_left - score > x_drop {
            break;
        }
    }
    // Right, after the anchor
    let mut score = 0;
    let mut best_right = 0;
    let mut right_len = 0;
    let max_right = (query.len() - q_anchor - 1).min(subject.len() - s_anchor - 1);
    for k in 0..max_right {
        score += matrix.score(query[q_anchor + 1 + k], subject[s_anchor + 1 + k]);
        if score > best_right {
            best_right = score;
            right_len = k + 1;
        } else if best_right - score > x_drop {
            break;
        }
    }
    let total = best_left + best_right;
    if total <= 0 {
        return None;
    }
    let q_start = q_anchor + 1 - left_len;
    Some((total, q_start, q_anchor + right_len))
}
