//! Full affine-gap extension, significance gate and alignment materialisation.
//!
//! Each surviving pair is extended with X-drop bounded Gotoh DP on the full
//! sequences: a preliminary pass with the gapped X-drop decides the gate,
//! and passing candidates are widened with the final X-drop, keeping the
//! better extension on each side. Nothing is inserted for a candidate that
//! fails at any step.

use crate::algorithm::common::diagnostics::PipelineCounters;
use crate::align::{ungapped_xdrop, AlignmentSplitter, GappedExtension, XDropAligner};
use crate::common::Alignment;
use crate::seed::SeedOccurrence;

use super::context::SearchContext;
use super::hit::Hit;

pub struct FullGapExtender {
    aligner: XDropAligner,
    splitter: AlignmentSplitter,
}

impl FullGapExtender {
    pub fn new(ctx: &SearchContext<'_>) -> Self {
        Self {
            aligner: XDropAligner::new(),
            splitter: AlignmentSplitter::new(ctx.params.splitter_max_span, ctx.params.splitter_band_margin),
        }
    }

    /// Extend every surviving pair of `hit`.
    pub fn extend(&mut self, hit: &Hit<'_>, ctx: &SearchContext<'_>) {
        for &pair in &hit.pairs {
            if ctx.cancel.is_cancelled() {
                return;
            }
            let (s_occ, q_occ) = hit.occurrences_of(pair);
            self.extend_pair(s_occ, q_occ, ctx);
        }
    }

    fn extend_pair(&mut self, s_occ: &SeedOccurrence, q_occ: &SeedOccurrence, ctx: &SearchContext<'_>) {
        let counters = ctx.counters;
        counters.full_gap.add_input(1);

        let (q_id, s_id) = (q_occ.sequence, s_occ.sequence);
        let query = ctx.query_db.data(q_id as usize);
        let subject = ctx.subject_db.data(s_id as usize);
        let qa = q_occ.offset_in_sequence as usize;
        let sa = s_occ.offset_in_sequence as usize;

        if ctx.container.does_exist(q_id, s_id, qa, sa, ctx.layout.band) {
            counters.full_gap.add_duplicates(1);
            return;
        }

        let Some(prelim) = self
            .aligner
            .extend(query, subject, qa, sa, ctx.matrix, ctx.gaps, ctx.params.xdrop_gapped)
        else {
            PipelineCounters::add(&counters.gate_failed, 1);
            return;
        };
        if !ctx.stats.passes(q_id, prelim.score, query.len(), subject.len()) {
            PipelineCounters::add(&counters.gate_failed, 1);
            return;
        }

        let ext = self
            .aligner
            .widen(query, subject, qa, sa, &prelim, ctx.matrix, ctx.gaps, ctx.params.xdrop_final);

        self.register_core(q_occ, s_occ, query, subject, ctx);

        let Some(alignment) = self.materialise(q_id, s_id, query, subject, ext, ctx) else {
            return;
        };
        if ctx.container.insert(alignment) {
            PipelineCounters::add(&counters.inserted, 1);
            counters.full_gap.add_output(1);
        } else {
            PipelineCounters::add(&counters.container_duplicates, 1);
        }
    }

    /// Mark the ungapped core around the anchor as explored, so later seeds
    /// on the same stretch of diagonal are dropped by the earlier stages.
    fn register_core(
        &self,
        q_occ: &SeedOccurrence,
        s_occ: &SeedOccurrence,
        query: &[u8],
        subject: &[u8],
        ctx: &SearchContext<'_>,
    ) {
        let qa = q_occ.offset_in_sequence as usize;
        let sa = s_occ.offset_in_sequence as usize;
        let q_base = q_occ.offset_in_database - qa as u64;
        let diagonal = q_occ.offset_in_database as i64 - s_occ.offset_in_database as i64;
        let (start, stop) = match ungapped_xdrop(query, subject, qa, sa, ctx.matrix, ctx.params.xdrop_ungapped) {
            Some((_, cs, ce)) => (cs, ce),
            None => (qa, (qa + ctx.layout.span).min(query.len()).saturating_sub(1)),
        };
        ctx.dedup.insert(q_base + start as u64, q_base + stop as u64, diagonal);
    }

    fn materialise(
        &mut self,
        q_id: u32,
        s_id: u32,
        query: &[u8],
        subject: &[u8],
        ext: GappedExtension,
        ctx: &SearchContext<'_>,
    ) -> Option<Alignment> {
        let q_slice = &query[ext.q_start..=ext.q_end];
        let s_slice = &subject[ext.s_start..=ext.s_end];
        let split = match self.splitter.split(
            q_slice,
            s_slice,
            ctx.matrix,
            ctx.gaps,
            ctx.params.keep_aligned_strings,
        ) {
            Ok(split) => split,
            Err(e) => {
                PipelineCounters::add(&ctx.counters.capacity_exceeded, 1);
                log::warn!("query {} subject {}: {}", q_id, s_id, e);
                return None;
            }
        };

        let space = ctx.stats.search_space(q_id);
        let evalue = ctx.stats.score_to_evalue(&space, ext.score, query.len(), subject.len());
        let (query_aligned, subject_aligned) = match split.aligned {
            Some((q, s)) => (Some(q), Some(s)),
            None => (None, None),
        };
        Some(Alignment {
            query: q_id,
            subject: s_id,
            q_start: ext.q_start,
            q_end: ext.q_end,
            s_start: ext.s_start,
            s_end: ext.s_end,
            score: ext.score,
            bit_score: ctx.stats.bit_score(ext.score),
            evalue,
            stats: split.stats,
            query_aligned,
            subject_aligned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchParams;

    use super::super::fixture::{StageFixture, CORE, CORE_HOMOLOG};
    use super::super::hit::CandidatePair;

    const PAIR: CandidatePair = CandidatePair { subject: 0, query: 0 };

    #[test]
    fn test_gate_failure_leaves_no_trace() {
        let params = SearchParams {
            evalue: 1e-300,
            ..Default::default()
        };
        let fx = StageFixture::new(&[CORE], &[CORE], params);
        let ctx = fx.context();
        let subjects = [fx.subject_occurrence(0, 50)];
        let queries = [fx.query_occurrence(0, 50)];
        let hit = fx.hit_with_pairs(&subjects, &queries, &[PAIR]);
        FullGapExtender::new(&ctx).extend(&hit, &ctx);

        assert!(fx.container.is_empty());
        assert!(fx.dedup.is_empty());
        let counts = fx.counters.snapshot();
        assert_eq!(counts.gate_failed, 1);
        assert_eq!(counts.inserted, 0);
        assert_eq!((counts.full_gap.input, counts.full_gap.output), (1, 0));
    }

    #[test]
    fn test_passing_candidate_registers_ungapped_core() {
        // The filler shifts query database offsets away from subject offsets
        let filler = &CORE_HOMOLOG[..30];
        let mut fx = StageFixture::new(&[filler, CORE], &[CORE], SearchParams::default());
        let ctx = fx.context();
        let subjects = [fx.subject_occurrence(0, 50)];
        let queries = [fx.query_occurrence(1, 50)];
        assert_eq!(queries[0].offset_in_database, 80);
        let hit = fx.hit_with_pairs(&subjects, &queries, &[PAIR]);
        let mut stage = FullGapExtender::new(&ctx);
        stage.extend(&hit, &ctx);

        // Core spans the whole identical sequence, in query database coordinates
        let diagonal = 80 - 50;
        assert_eq!(fx.dedup.len(), 1);
        assert!(fx.dedup.exists(30, diagonal));
        assert!(fx.dedup.exists(129, diagonal));
        assert!(!fx.dedup.exists(29, diagonal));
        assert!(!fx.dedup.exists(130, diagonal));

        // The same anchor again is already covered by the accepted alignment
        stage.extend(&hit, &ctx);
        let counts = fx.counters.snapshot();
        assert_eq!((counts.full_gap.input, counts.full_gap.output, counts.full_gap.duplicates), (2, 1, 1));
        assert_eq!(counts.inserted, 1);

        let alignments = fx.container.alignments();
        assert_eq!(alignments.len(), 1);
        let a = &alignments[0];
        assert_eq!((a.query, a.subject), (1, 0));
        assert_eq!((a.q_start, a.q_end, a.s_start, a.s_end), (0, 99, 0, 99));
        assert!(a.evalue <= 10.0);
    }
}
