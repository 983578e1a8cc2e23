//! Read-only state shared by every pipe of one subject block.

use crate::algorithm::common::diagnostics::PipelineCounters;
use crate::align::GapCosts;
use crate::config::SearchParams;
use crate::dispatch::CancellationToken;
use crate::seed::Neighborhood;
use crate::sequence::SequenceDatabase;
use crate::simd::{BandGeometry, LaneBackend};
use crate::stats::StatisticsModel;
use crate::utils::matrix::{ScoreMatrix, TABLE_CELLS};

use super::container::AlignmentContainer;
use super::dedup::DiagonalDedup;

/// Where each stage's window sits inside the prefetched neighborhood.
///
/// The neighborhood holds `left` residues before the seed anchor and
/// `left + span` from it on, so the seed sits at `left..left + span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLayout {
    pub span: usize,
    pub ungapped: usize,
    pub small_gap: usize,
    pub band: usize,
    left: usize,
}

impl WindowLayout {
    pub fn new(span: usize, ungapped: usize, small_gap: usize, band: usize) -> Self {
        let left = ungapped.max(small_gap + band);
        Self {
            span,
            ungapped,
            small_gap,
            band,
            left,
        }
    }

    pub fn from_params(params: &SearchParams) -> Self {
        Self::new(
            params.seed_span,
            params.ungap_neighbourhood,
            params.small_gap_neighbourhood,
            params.small_gap_band_width,
        )
    }

    pub fn neighborhood(&self) -> Neighborhood {
        Neighborhood::new(self.left, self.left + self.span)
    }

    pub fn ungapped_width(&self) -> usize {
        2 * self.ungapped + self.span
    }

    #[inline]
    pub fn ungapped_window<'w>(&self, window: &'w [u8]) -> &'w [u8] {
        let from = self.left - self.ungapped;
        &window[from..from + self.ungapped_width()]
    }

    pub fn band_geometry(&self, gaps: GapCosts) -> BandGeometry {
        BandGeometry {
            query_len: 2 * self.small_gap + self.span,
            band: self.band,
            gap_open: gaps.open.clamp(0, i16::MAX as i32) as i16,
            gap_extend: gaps.extend.clamp(0, i16::MAX as i32) as i16,
        }
    }

    #[inline]
    pub fn small_gap_query<'w>(&self, window: &'w [u8]) -> &'w [u8] {
        let from = self.left - self.small_gap;
        &window[from..from + 2 * self.small_gap + self.span]
    }

    /// Query window widened by the band on each side.
    #[inline]
    pub fn small_gap_subject<'w>(&self, window: &'w [u8]) -> &'w [u8] {
        let from = self.left - self.small_gap - self.band;
        &window[from..from + 2 * (self.small_gap + self.band) + self.span]
    }
}

/// Everything a pipe reads, plus the two shared mutable stores.
pub struct SearchContext<'a> {
    pub params: &'a SearchParams,
    pub matrix: &'a ScoreMatrix,
    pub biased_table: &'a [u8; TABLE_CELLS],
    pub word_table: &'a [i16; TABLE_CELLS],
    pub backend: LaneBackend,
    pub gaps: GapCosts,
    pub layout: WindowLayout,
    pub query_db: &'a SequenceDatabase,
    pub subject_db: &'a SequenceDatabase,
    pub stats: &'a dyn StatisticsModel,
    pub dedup: &'a DiagonalDedup,
    pub container: &'a AlignmentContainer,
    pub counters: &'a PipelineCounters,
    pub cancel: &'a CancellationToken,
}
