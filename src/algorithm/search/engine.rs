//! Run driver: statistics, seed indices, pipe dispatch and result finishing.
//!
//! Setup errors surface from [`SearchEngine::new`] and at the start of
//! [`SearchEngine::run`], before any worker starts. Once the pipes run, no
//! error can abort the search; cancellation only ends it early.

use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;

use crate::algorithm::common::diagnostics::{diagnostics_enabled, CounterSnapshot, PipelineCounters};
use crate::align::GapCosts;
use crate::config::{ScoringMatrix, SearchParams};
use crate::dispatch::{CancellationToken, Command, Dispatcher};
use crate::error::{ConfigError, Result};
use crate::seed::{SeedIndex, SeedModel};
use crate::sequence::SequenceDatabase;
use crate::simd::LaneBackend;
use crate::stats::KarlinStatistics;
use crate::utils::matrix::ScoreMatrix;

use super::container::AlignmentContainer;
use super::context::{SearchContext, WindowLayout};
use super::dedup::DiagonalDedup;
use super::hit_source::{HitSource, HitSourceConfig};
use super::pipe::Pipe;

/// Everything a finished run hands back.
pub struct SearchOutput {
    /// Shrunk, sorted and truncated alignments
    pub container: AlignmentContainer,
    pub counters: CounterSnapshot,
    /// True when the run stopped on the cancellation token
    pub cancelled: bool,
    pub backend: LaneBackend,
}

pub struct SearchEngine {
    params: SearchParams,
    matrix: Option<ScoreMatrix>,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
    diagnostics: bool,
}

impl SearchEngine {
    pub fn new(params: SearchParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            matrix: None,
            cancel: CancellationToken::new(),
            progress: None,
            diagnostics: diagnostics_enabled(),
        })
    }

    /// Score with `matrix` instead of the built-in one. Statistics are still
    /// looked up by the configured matrix name.
    pub fn with_matrix(mut self, matrix: ScoreMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Token that stops the run when cancelled, from any thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Advanced once per seed code and subject block.
    pub fn set_progress(&mut self, progress: ProgressBar) {
        self.progress = Some(progress);
    }

    pub fn set_diagnostics(&mut self, enabled: bool) {
        self.diagnostics = enabled;
    }

    fn score_matrix(&self) -> Result<ScoreMatrix> {
        match (&self.matrix, self.params.matrix) {
            (Some(m), _) => Ok(m.clone()),
            (None, ScoringMatrix::Blosum62) => Ok(ScoreMatrix::blosum62()),
            (None, other) => Err(ConfigError::MatrixUnavailable {
                matrix: other.name().to_string(),
            }),
        }
    }

    /// Search every query against every subject.
    pub fn run(&self, query: Arc<SequenceDatabase>, subject: Arc<SequenceDatabase>) -> Result<SearchOutput> {
        let params = &self.params;
        let started = Instant::now();

        let query_lengths: Vec<usize> = (0..query.len()).map(|i| query.sequence_len(i)).collect();
        let stats = KarlinStatistics::new(
            params.matrix,
            params.gap_open,
            params.gap_extend,
            &query_lengths,
            subject.total_residues(),
            subject.len(),
            params.evalue,
            params.use_cutoff_table,
        )?;
        let matrix = self.score_matrix()?;
        let model = SeedModel::new(params.seed_span, params.seed_alphabet)?;
        let dispatcher = Dispatcher::new(params.num_threads)?;
        let backend = LaneBackend::detect();
        log::info!(
            "searching {} queries ({} residues) against {} subjects ({} residues), {} workers, {} lanes",
            query.len(),
            query.total_residues(),
            subject.len(),
            subject.total_residues(),
            dispatcher.workers(),
            backend.name()
        );

        let biased_table = matrix.biased_table();
        let word_table = matrix.word_table();
        let layout = WindowLayout::from_params(params);
        let gaps = GapCosts::new(params.gap_open, params.gap_extend);
        let counters = PipelineCounters::new();
        let dedup = DiagonalDedup::new(query.total_residues(), subject.total_residues());
        let mut container = AlignmentContainer::new(params.overlap_fraction);

        let query_index = SeedIndex::build(Arc::clone(&query), model.clone(), &dispatcher);
        log::debug!("query index: {} occurrences", query_index.total_occurrences());

        let codes = model.codes(params.seeds_use_ratio);
        let blocks = subject.blocks(params.max_database_size);
        if let Some(progress) = &self.progress {
            progress.set_length((codes.len() * blocks.len()) as u64);
        }
        let source_config = HitSourceConfig {
            neighborhood: Some(layout.neighborhood()),
            batch_size: params.batch_size,
            max_occurrences: params.max_occurrences_per_seed,
        };

        for (b, block) in blocks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }
            log::debug!(
                "subject block {}: sequences {:?}, {} residues",
                b,
                block,
                subject.range_residues(&block)
            );
            let subject_index = SeedIndex::build_range(Arc::clone(&subject), block, model.clone(), &dispatcher);

            let ctx = SearchContext {
                params,
                matrix: &matrix,
                biased_table: &biased_table,
                word_table: &word_table,
                backend,
                gaps,
                layout,
                query_db: &query,
                subject_db: &subject,
                stats: &stats,
                dedup: &dedup,
                container: &container,
                counters: &counters,
                cancel: &self.cancel,
            };

            let mut source = HitSource::new(&subject_index, &query_index, codes.clone(), source_config);
            if let Some(progress) = &self.progress {
                source = source.with_progress(progress.clone());
            }
            if params.reorder_seeds {
                source.reorder_by_load();
            }
            let hit_counters = Arc::clone(source.counters());
            let children = source.split(dispatcher.workers(), params.reorder_seeds);
            let pipes: Vec<Box<dyn Command + '_>> = children
                .into_iter()
                .map(|child| Box::new(Pipe::new(child, &ctx)) as Box<dyn Command + '_>)
                .collect();
            dispatcher.dispatch(pipes);

            PipelineCounters::add(&counters.seeds_visited, hit_counters.seeds_visited());
            PipelineCounters::add(&counters.hits, hit_counters.hits());
            PipelineCounters::add(&counters.candidate_pairs, hit_counters.pairs());
        }

        let cancelled = self.cancel.is_cancelled();
        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let inserted = container.len();
        let divisor = params.shrink_shift_divisor;
        let removed = dispatcher.install(|| container.shrink(divisor));
        container.truncate(params.max_hits_per_query, params.max_hsps_per_hit);
        log::info!(
            "search {} in {:.2?}: {} alignments inserted, {} removed by shrink, {} reported",
            if cancelled { "cancelled" } else { "finished" },
            started.elapsed(),
            inserted,
            removed,
            container.len()
        );
        if self.diagnostics {
            counters.log_summary();
        }

        Ok(SearchOutput {
            container,
            counters: counters.snapshot(),
            cancelled,
            backend,
        })
    }
}
