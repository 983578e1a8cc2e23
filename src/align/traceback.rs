//! Banded traceback storage and the traceback walk.
//!
//! Row `i` of the band stores diagonals `lo..=lo + width - 1`; cell `k` of row
//! `i` is column `j = i + lo + k`. Each cell keeps one byte of trace bits.

use super::result::EditOp;

/// Best-score source of a cell: diagonal move
pub const FROM_DIAG: u8 = 0;
/// Best-score source of a cell: horizontal gap (gap in query)
pub const FROM_QUERY_GAP: u8 = 1;
/// Best-score source of a cell: vertical gap (gap in subject)
pub const FROM_SUBJECT_GAP: u8 = 2;
const SOURCE_MASK: u8 = 0b11;
/// The horizontal gap state extends an open gap
pub const QUERY_GAP_EXTENDS: u8 = 1 << 2;
/// The vertical gap state extends an open gap
pub const SUBJECT_GAP_EXTENDS: u8 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Best,
    QueryGap,
    SubjectGap,
}

/// Trace bits for a banded DP, reused across alignments.
#[derive(Debug, Default)]
pub struct BandedTrace {
    data: Vec<u8>,
    rows: usize,
    width: usize,
    lo: isize,
}

impl BandedTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for `rows` rows of `width` cells starting at diagonal `lo`.
    /// Storage only ever grows, doubling when it must.
    pub fn reset(&mut self, rows: usize, width: usize, lo: isize) {
        let cells = rows * width;
        if cells > self.data.capacity() {
            let target = cells.max(self.data.capacity() * 2);
            self.data.reserve(target - self.data.len());
        }
        self.data.clear();
        self.data.resize(cells, 0);
        self.rows = rows;
        self.width = width;
        self.lo = lo;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    fn cell_index(&self, row: usize, col: usize) -> Option<usize> {
        let k = col as isize - row as isize - self.lo;
        if row >= self.rows || k < 0 || k as usize >= self.width {
            return None;
        }
        Some(row * self.width + k as usize)
    }

    #[inline]
    pub fn set(&mut self, row: usize, band_cell: usize, bits: u8) {
        self.data[row * self.width + band_cell] = bits;
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cell_index(row, col).map(|idx| self.data[idx])
    }

    /// Walk back from `(end_row, end_col)` to the origin.
    ///
    /// Returns the edit script in forward order, or `None` if the walk left
    /// the band.
    pub fn traceback(&self, end_row: usize, end_col: usize, query: &[u8], subject: &[u8]) -> Option<Vec<EditOp>> {
        let mut ops = Vec::with_capacity(end_row.max(end_col) + 8);
        let (mut row, mut col) = (end_row, end_col);
        let mut state = State::Best;

        while row > 0 || col > 0 {
            let bits = self.get(row, col)?;
            match state {
                State::Best => match bits & SOURCE_MASK {
                    FROM_DIAG => {
                        if row == 0 || col == 0 {
                            return None;
                        }
                        let op = if query[row - 1] == subject[col - 1] {
                            EditOp::Match
                        } else {
                            EditOp::Mismatch
                        };
                        ops.push(op);
                        row -= 1;
                        col -= 1;
                    }
                    FROM_QUERY_GAP => state = State::QueryGap,
                    _ => state = State::SubjectGap,
                },
                State::QueryGap => {
                    if col == 0 {
                        return None;
                    }
                    ops.push(EditOp::Del);
                    col -= 1;
                    if bits & QUERY_GAP_EXTENDS == 0 {
                        state = State::Best;
                    }
                }
                State::SubjectGap => {
                    if row == 0 {
                        return None;
                    }
                    ops.push(EditOp::Ins);
                    row -= 1;
                    if bits & SUBJECT_GAP_EXTENDS == 0 {
                        state = State::Best;
                    }
                }
            }
        }

        // Reverse to get forward order
        ops.reverse();
        Some(ops)
    }
}
