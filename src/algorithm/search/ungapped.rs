//! Ungapped filter: best running-sum score of fixed windows around the seed.
//!
//! One subject window is scored against up to 16 query windows per kernel
//! call. Scores saturate at the lane ceiling, and the threshold is clamped to
//! that ceiling before comparing, so a saturated lane always passes.

use crate::simd::{byte_ceiling, ungapped_scores, BYTE_LANES};

use super::constants::FORWARD_BATCH;
use super::context::SearchContext;
use super::hit::{CandidatePair, Hit, PairCursor};

pub struct UngapExtender {
    threshold: i32,
}

impl UngapExtender {
    pub fn new(ctx: &SearchContext<'_>) -> Self {
        let ceiling = byte_ceiling(ctx.matrix.bias());
        let threshold = ctx.params.ungap_score_threshold.min(ceiling);
        if threshold < ctx.params.ungap_score_threshold {
            log::debug!(
                "ungapped threshold {} clamped to lane ceiling {}",
                ctx.params.ungap_score_threshold,
                ceiling
            );
        }
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Score the cross product from `cursor` on, collecting survivors into
    /// the Hit's pair list until a forwarding batch is full. Returns true
    /// while candidates remain behind the cursor.
    pub fn next_batch(&mut self, hit: &mut Hit<'_>, cursor: &mut PairCursor, ctx: &SearchContext<'_>) -> bool {
        hit.begin_batch();
        let mut pairs = std::mem::take(&mut hit.pairs);
        let more = self.fill(hit, cursor, &mut pairs, ctx);
        ctx.counters.ungapped.add_output(pairs.len());
        hit.pairs = pairs;
        more
    }

    fn fill(
        &mut self,
        hit: &Hit<'_>,
        cursor: &mut PairCursor,
        pairs: &mut Vec<CandidatePair>,
        ctx: &SearchContext<'_>,
    ) -> bool {
        let layout = &ctx.layout;
        let width = layout.ungapped_width();
        let subjects = hit.subject_occurrences();
        let queries = hit.query_occurrences();

        while cursor.subject < subjects.len() {
            let s_occ = subjects[cursor.subject];
            let s_window = layout.ungapped_window(hit.subject_window(cursor.subject));
            let s_lanes = [s_window; BYTE_LANES];
            while cursor.query < queries.len() {
                let n = (queries.len() - cursor.query).min(BYTE_LANES);
                let mut q_lanes: [&[u8]; BYTE_LANES] = [&[]; BYTE_LANES];
                for (k, lane) in q_lanes.iter_mut().enumerate().take(n) {
                    *lane = layout.ungapped_window(hit.query_window(cursor.query + k));
                }
                let scores = ungapped_scores(
                    ctx.backend,
                    ctx.biased_table,
                    ctx.matrix.bias(),
                    &s_lanes[..n],
                    &q_lanes[..n],
                    width,
                );
                ctx.counters.ungapped.add_input(n);
                for (k, &score) in scores.iter().enumerate().take(n) {
                    if (score as i32) < self.threshold {
                        continue;
                    }
                    let q_occ = queries[cursor.query + k];
                    let diagonal = q_occ.offset_in_database as i64 - s_occ.offset_in_database as i64;
                    if ctx.dedup.exists(q_occ.offset_in_database, diagonal) {
                        ctx.counters.ungapped.add_duplicates(1);
                        continue;
                    }
                    pairs.push(CandidatePair {
                        subject: cursor.subject as u32,
                        query: (cursor.query + k) as u32,
                    });
                }
                cursor.query += n;
                if pairs.len() >= FORWARD_BATCH {
                    if cursor.query >= queries.len() {
                        cursor.query = 0;
                        cursor.subject += 1;
                    }
                    return cursor.subject < subjects.len();
                }
            }
            cursor.query = 0;
            cursor.subject += 1;
        }
        false
    }
}
