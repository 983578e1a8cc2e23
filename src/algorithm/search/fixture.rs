//! Owned state behind a [`SearchContext`], for driving single stages in tests.

use crate::algorithm::common::diagnostics::PipelineCounters;
use crate::align::GapCosts;
use crate::config::SearchParams;
use crate::dispatch::CancellationToken;
use crate::seed::SeedOccurrence;
use crate::sequence::{fill_neighborhood, SequenceDatabase};
use crate::simd::LaneBackend;
use crate::stats::KarlinStatistics;
use crate::utils::matrix::{ScoreMatrix, TABLE_CELLS};

use super::container::AlignmentContainer;
use super::context::{SearchContext, WindowLayout};
use super::dedup::DiagonalDedup;
use super::hit::{CandidatePair, Hit};

/// 100 residues without internal repeats.
pub const CORE: &str = "YKNTARICGENSIPVEWIAHQKGPGDFYYRFFAAHHGGLMHVHGHPLANQGFKDMLYWAYMDLNLSMGSSGCKANPAVQNPWARCGYHEIRNTNTKREWN";

/// [`CORE`] with every even position substituted.
pub const CORE_HOMOLOG: &str =
    "LKCTRRDCIEMSVPNEFINHKKWPDDMYMRMFHADHFGMMTVGGCPDAWQQFCDILNWLYSDRNFSCGCSTCNAHPGVYNFWRRFGGHRINNFNCKQELN";

pub struct StageFixture {
    pub params: SearchParams,
    pub matrix: ScoreMatrix,
    biased_table: Box<[u8; TABLE_CELLS]>,
    word_table: Box<[i16; TABLE_CELLS]>,
    pub layout: WindowLayout,
    pub query_db: SequenceDatabase,
    pub subject_db: SequenceDatabase,
    stats: KarlinStatistics,
    pub dedup: DiagonalDedup,
    pub container: AlignmentContainer,
    pub counters: PipelineCounters,
    pub cancel: CancellationToken,
}

impl StageFixture {
    pub fn new(queries: &[&str], subjects: &[&str], params: SearchParams) -> Self {
        let matrix = ScoreMatrix::blosum62();
        let query_db = SequenceDatabase::from_strings(queries);
        let subject_db = SequenceDatabase::from_strings(subjects);
        let query_lengths: Vec<usize> = (0..query_db.len()).map(|i| query_db.sequence_len(i)).collect();
        let stats = KarlinStatistics::new(
            params.matrix,
            params.gap_open,
            params.gap_extend,
            &query_lengths,
            subject_db.total_residues(),
            subject_db.len(),
            params.evalue,
            params.use_cutoff_table,
        )
        .unwrap();
        Self {
            biased_table: matrix.biased_table(),
            word_table: matrix.word_table(),
            layout: WindowLayout::from_params(&params),
            dedup: DiagonalDedup::new(query_db.total_residues(), subject_db.total_residues()),
            container: AlignmentContainer::new(params.overlap_fraction),
            counters: PipelineCounters::new(),
            cancel: CancellationToken::new(),
            params,
            matrix,
            query_db,
            subject_db,
            stats,
        }
    }

    pub fn context(&self) -> SearchContext<'_> {
        SearchContext {
            params: &self.params,
            matrix: &self.matrix,
            biased_table: &self.biased_table,
            word_table: &self.word_table,
            backend: LaneBackend::detect(),
            gaps: GapCosts::new(self.params.gap_open, self.params.gap_extend),
            layout: self.layout,
            query_db: &self.query_db,
            subject_db: &self.subject_db,
            stats: &self.stats,
            dedup: &self.dedup,
            container: &self.container,
            counters: &self.counters,
            cancel: &self.cancel,
        }
    }

    pub fn query_occurrence(&self, sequence: u32, offset: u32) -> SeedOccurrence {
        occurrence(&self.query_db, sequence, offset)
    }

    pub fn subject_occurrence(&self, sequence: u32, offset: u32) -> SeedOccurrence {
        occurrence(&self.subject_db, sequence, offset)
    }

    /// A Hit over the given occurrences with their neighborhoods filled in.
    pub fn hit<'o>(&self, subjects: &'o [SeedOccurrence], queries: &'o [SeedOccurrence]) -> Hit<'o> {
        let nb = self.layout.neighborhood();
        let mut window = vec![0u8; nb.width()];
        let mut hit = Hit::new();
        hit.reset(0, Some(nb));
        for occ in subjects {
            fill_neighborhood(
                self.subject_db.data(occ.sequence as usize),
                occ.offset_in_sequence as usize,
                nb.left,
                nb.right,
                &mut window,
            );
            hit.push_subject(occ, &window);
        }
        for occ in queries {
            fill_neighborhood(
                self.query_db.data(occ.sequence as usize),
                occ.offset_in_sequence as usize,
                nb.left,
                nb.right,
                &mut window,
            );
            hit.push_query(occ, &window);
        }
        hit
    }

    /// A Hit holding exactly the listed pairs, as the ungapped stage leaves it.
    pub fn hit_with_pairs<'o>(
        &self,
        subjects: &'o [SeedOccurrence],
        queries: &'o [SeedOccurrence],
        pairs: &[CandidatePair],
    ) -> Hit<'o> {
        let mut hit = self.hit(subjects, queries);
        hit.begin_batch();
        hit.pairs.extend_from_slice(pairs);
        hit
    }
}

fn occurrence(db: &SequenceDatabase, sequence: u32, offset: u32) -> SeedOccurrence {
    let start = db.sequence(sequence as usize).unwrap().offset_in_database;
    SeedOccurrence {
        sequence,
        offset_in_sequence: offset,
        offset_in_database: start as u64 + offset as u64,
    }
}
