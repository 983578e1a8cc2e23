//! Banded affine-gap filter over the ungapped survivors.

use crate::simd::{banded_scores, BandGeometry, WORD_LANES};

use super::context::SearchContext;
use super::hit::{CandidatePair, Hit};

pub struct SmallGapExtender {
    geometry: BandGeometry,
    threshold: i32,
}

impl SmallGapExtender {
    pub fn new(ctx: &SearchContext<'_>) -> Self {
        Self {
            geometry: ctx.layout.band_geometry(ctx.gaps),
            threshold: ctx.params.small_gap_threshold,
        }
    }

    /// Keep the pairs whose banded score reaches the threshold and whose
    /// anchor is not already covered within the band.
    pub fn filter(&mut self, hit: &mut Hit<'_>, ctx: &SearchContext<'_>) {
        let mut pairs = std::mem::take(&mut hit.pairs);
        ctx.counters.small_gap.add_input(pairs.len());
        let layout = &ctx.layout;
        let band = self.geometry.band;
        let mut kept = 0;
        let mut chunk = [CandidatePair { subject: 0, query: 0 }; WORD_LANES];

        let mut i = 0;
        while i < pairs.len() {
            let n = (pairs.len() - i).min(WORD_LANES);
            chunk[..n].copy_from_slice(&pairs[i..i + n]);
            let mut q_lanes: [&[u8]; WORD_LANES] = [&[]; WORD_LANES];
            let mut s_lanes: [&[u8]; WORD_LANES] = [&[]; WORD_LANES];
            for k in 0..n {
                q_lanes[k] = layout.small_gap_query(hit.query_window(chunk[k].query as usize));
                s_lanes[k] = layout.small_gap_subject(hit.subject_window(chunk[k].subject as usize));
            }
            let scores = banded_scores(ctx.backend, ctx.word_table, &q_lanes[..n], &s_lanes[..n], self.geometry);
            for k in 0..n {
                if (scores[k] as i32) < self.threshold {
                    continue;
                }
                let (s_occ, q_occ) = hit.occurrences_of(chunk[k]);
                let diagonal = q_occ.offset_in_database as i64 - s_occ.offset_in_database as i64;
                if ctx.dedup.exists_within(q_occ.offset_in_database, diagonal, band) {
                    ctx.counters.small_gap.add_duplicates(1);
                    continue;
                }
                pairs[kept] = chunk[k];
                kept += 1;
            }
            i += n;
        }

        pairs.truncate(kept);
        ctx.counters.small_gap.add_output(kept);
        hit.pairs = pairs;
    }
}
