//! Score kernels evaluated across lanes, one candidate pair per lane.

use crate::utils::matrix::{ScoreMatrix, TABLE_CELLS, TABLE_WIDTH};

use super::lanes::{ByteLanes, LaneBackend, ScalarBytes, ScalarWords, WordLanes, BYTE_LANES, WORD_LANES};

/// Floor used for unreachable gap states in the banded kernel.
pub const WORD_NEG: i16 = i16::MIN / 2;

#[inline(always)]
fn cell(a: u8, b: u8) -> usize {
    ((a as usize) & (TABLE_WIDTH - 1)) * TABLE_WIDTH + ((b as usize) & (TABLE_WIDTH - 1))
}

/// Highest running score a biased byte lane can hold.
#[inline]
pub fn byte_ceiling(bias: u8) -> i32 {
    u8::MAX as i32 - bias as i32
}

/// Best running-sum score (maximum local sub-window) of each lane's
/// `subjects[k]` vs `queries[k]` over the first `width` positions.
///
/// Scores saturate at [`byte_ceiling`]. Lanes beyond `subjects.len()` score 0.
pub fn ungapped_scores(
    backend: LaneBackend,
    table: &[u8; TABLE_CELLS],
    bias: u8,
    subjects: &[&[u8]],
    queries: &[&[u8]],
    width: usize,
) -> [u8; BYTE_LANES] {
    match backend {
        #[cfg(target_arch = "x86_64")]
        LaneBackend::Sse2 => ungapped_kernel::<super::lanes::sse2::Sse2Bytes>(table, bias, subjects, queries, width),
        #[cfg(target_arch = "aarch64")]
        LaneBackend::Neon => ungapped_kernel::<super::lanes::neon::NeonBytes>(table, bias, subjects, queries, width),
        _ => ungapped_kernel::<ScalarBytes>(table, bias, subjects, queries, width),
    }
}

#[inline(always)]
fn ungapped_kernel<L: ByteLanes>(
    table: &[u8; TABLE_CELLS],
    bias: u8,
    subjects: &[&[u8]],
    queries: &[&[u8]],
    width: usize,
) -> [u8; BYTE_LANES] {
    let lanes = subjects.len().min(queries.len()).min(BYTE_LANES);
    let bias_v = L::splat(bias);
    let mut running = L::splat(0);
    let mut best = L::splat(0);
    let mut column = [0u8; BYTE_LANES];
    for p in 0..width {
        for k in 0..lanes {
            column[k] = table[cell(subjects[k][p], queries[k][p])];
        }
        running = running.adds(L::load(&column)).subs(bias_v);
        best = best.max(running);
    }
    let mut out = [0u8; BYTE_LANES];
    best.store(&mut out);
    out
}

/// Scalar reference for [`ungapped_scores`]: running sum clamped to
/// `[0, ceiling]`, maximum over all positions.
pub fn ungapped_score_reference(matrix: &ScoreMatrix, subject: &[u8], query: &[u8], ceiling: i32) -> i32 {
    let mut running = 0i32;
    let mut best = 0i32;
    for (&s, &q) in subject.iter().zip(query) {
        running = (running + matrix.score(s, q)).clamp(0, ceiling);
        best = best.max(running);
    }
    best
}

/// Band shape for [`banded_scores`].
#[derive(Debug, Clone, Copy)]
pub struct BandGeometry {
    /// Residues in each query window
    pub query_len: usize,
    /// Diagonals explored on each side of the anchor diagonal
    pub band: usize,
    pub gap_open: i16,
    pub gap_extend: i16,
}

impl BandGeometry {
    /// Subject windows carry `band` extra residues on each side.
    pub fn subject_len(&self) -> usize {
        self.query_len + 2 * self.band
    }

    fn cells(&self) -> usize {
        2 * self.band + 1
    }
}

/// Best banded local affine-gap score of each lane. Query window `k` is
/// aligned against subject window `k`, restricted to `band` diagonals on
/// either side of the anchor diagonal.
pub fn banded_scores(
    backend: LaneBackend,
    table: &[i16; TABLE_CELLS],
    queries: &[&[u8]],
    subjects: &[&[u8]],
    geometry: BandGeometry,
) -> [i16; WORD_LANES] {
    match backend {
        #[cfg(target_arch = "x86_64")]
        LaneBackend::Sse2 => banded_kernel::<super::lanes::sse2::Sse2Words>(table, queries, subjects, geometry),
        #[cfg(target_arch = "aarch64")]
        LaneBackend::Neon => banded_kernel::<super::lanes::neon::NeonWords>(table, queries, subjects, geometry),
        _ => banded_kernel::<ScalarWords>(table, queries, subjects, geometry),
    }
}

fn banded_kernel<W: WordLanes>(
    table: &[i16; TABLE_CELLS],
    queries: &[&[u8]],
    subjects: &[&[u8]],
    geometry: BandGeometry,
) -> [i16; WORD_LANES] {
    let lanes = queries.len().min(subjects.len()).min(WORD_LANES);
    let cells = geometry.cells();
    let zero = W::splat(0);
    let neg = W::splat(WORD_NEG);
    let gap_oe = W::splat(geometry.gap_open.saturating_add(geometry.gap_extend));
    let gap_e = W::splat(geometry.gap_extend);

    // Band cell k of row i is subject position i + k (diagonal k - band).
    let mut h_prev = vec![zero; cells];
    let mut e_prev = vec![neg; cells];
    let mut h_cur = vec![zero; cells];
    let mut e_cur = vec![neg; cells];
    let mut best = zero;
    let mut scores = [0i16; WORD_LANES];

    for i in 0..geometry.query_len {
        let mut f = neg;
        for k in 0..cells {
            for lane in 0..lanes {
                scores[lane] = table[cell(queries[lane][i], subjects[lane][i + k])];
            }
            let diag = h_prev[k].adds(W::load(&scores));
            let e = if k + 1 < cells {
                h_prev[k + 1].subs(gap_oe).max(e_prev[k + 1].subs(gap_e))
            } else {
                neg
            };
            let h = diag.max(e).max(f).max(zero);
            f = h.subs(gap_oe).max(f.subs(gap_e));
            h_cur[k] = h;
            e_cur[k] = e;
            best = best.max(h);
        }
        std::mem::swap(&mut h_prev, &mut h_cur);
        std::mem::swap(&mut e_prev, &mut e_cur);
    }

    let mut out = [0i16; WORD_LANES];
    best.store(&mut out);
    out
}

/// Scalar i32 reference for [`banded_scores`] on one pair.
pub fn banded_score_reference(matrix: &ScoreMatrix, query: &[u8], subject: &[u8], geometry: BandGeometry) -> i32 {
    let cells = geometry.cells();
    let neg = WORD_NEG as i32;
    let gap_oe = geometry.gap_open as i32 + geometry.gap_extend as i32;
    let gap_e = geometry.gap_extend as i32;
    let mut h_prev = vec![0i32; cells];
    let mut e_prev = vec![neg; cells];
    let mut h_cur = vec![0i32; cells];
    let mut e_cur = vec![neg; cells];
    let mut best = 0;
    for i in 0..geometry.query_len {
        let mut f = neg;
        for k in 0..cells {
            let diag = h_prev[k] + matrix.score(query[i], subject[i + k]);
            let e = if k + 1 < cells {
                (h_prev[k + 1] - gap_oe).max(e_prev[k + 1] - gap_e)
            } else {
                neg
            };
            let h = diag.max(e).max(f).max(0);
            f = (h - gap_oe).max(f - gap_e);
            h_cur[k] = h;
            e_cur[k] = e;
            best = best.max(h);
        }
        std::mem::swap(&mut h_prev, &mut h_cur);
        std::mem::swap(&mut e_prev, &mut e_cur);
    }
    best
}
