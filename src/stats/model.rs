//! Significance model consulted by the full-gap gate.

use crate::config::ScoringMatrix;
use crate::error::Result;

use super::karlin::{bit_score, evalue, raw_score_from_evalue};
use super::search_space::SearchSpace;
use super::tables::{lookup_gapped_params, KarlinParams};

/// Converts raw scores to significance for one run.
pub trait StatisticsModel: Send + Sync {
    /// Precomputed minimum raw score for `query`, when the model gates on
    /// cutoff scores.
    fn cutoff_score(&self, query: u32) -> Option<i32>;

    /// Effective search space for `query`.
    fn search_space(&self, query: u32) -> SearchSpace;

    fn score_to_evalue(&self, search_space: &SearchSpace, score: i32, query_len: usize, subject_len: usize) -> f64;

    fn bit_score(&self, score: i32) -> f64;

    fn evalue_threshold(&self) -> f64;

    /// Gate: cutoff table when present, otherwise E-value against the threshold.
    fn passes(&self, query: u32, score: i32, query_len: usize, subject_len: usize) -> bool {
        match self.cutoff_score(query) {
            Some(cutoff) => score >= cutoff,
            None => {
                let space = self.search_space(query);
                self.score_to_evalue(&space, score, query_len, subject_len) <= self.evalue_threshold()
            }
        }
    }
}

/// Karlin-Altschul model with per-query length-adjusted search spaces.
#[derive(Debug, Clone)]
pub struct KarlinStatistics {
    params: KarlinParams,
    evalue_threshold: f64,
    search_spaces: Vec<SearchSpace>,
    cutoffs: Option<Vec<i32>>,
}

impl KarlinStatistics {
    /// Fails when the (matrix, gap costs) combination has no parameters.
    pub fn new(
        matrix: ScoringMatrix,
        gap_open: i32,
        gap_extend: i32,
        query_lengths: &[usize],
        db_residues: usize,
        db_sequences: usize,
        evalue_threshold: f64,
        use_cutoff_table: bool,
    ) -> Result<Self> {
        let params = lookup_gapped_params(matrix, gap_open, gap_extend)?;
        let search_spaces: Vec<SearchSpace> = query_lengths
            .iter()
            .map(|&len| SearchSpace::for_database_search(len, db_residues, db_sequences, &params))
            .collect();
        let cutoffs = use_cutoff_table.then(|| {
            search_spaces
                .iter()
                .map(|ss| raw_score_from_evalue(evalue_threshold, &params, ss))
                .collect()
        });
        log::debug!(
            "statistics: {} lambda={} K={} for {} queries",
            matrix,
            params.lambda,
            params.k,
            query_lengths.len()
        );
        Ok(Self {
            params,
            evalue_threshold,
            search_spaces,
            cutoffs,
        })
    }

    pub fn params(&self) -> &KarlinParams {
        &self.params
    }
}

impl StatisticsModel for KarlinStatistics {
    fn cutoff_score(&self, query: u32) -> Option<i32> {
        self.cutoffs.as_ref()?.get(query as usize).copied()
    }

    fn search_space(&self, query: u32) -> SearchSpace {
        self.search_spaces
            .get(query as usize)
            .copied()
            .unwrap_or_else(|| SearchSpace::simple(1, 1))
    }

    fn score_to_evalue(&self, search_space: &SearchSpace, score: i32, _query_len: usize, _subject_len: usize) -> f64 {
        evalue(bit_score(score, &self.params), search_space)
    }

    fn bit_score(&self, score: i32) -> f64 {
        bit_score(score, &self.params)
    }

    fn evalue_threshold(&self) -> f64 {
        self.evalue_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(evalue: f64, cutoffs: bool) -> KarlinStatistics {
        KarlinStatistics::new(ScoringMatrix::Blosum62, 11, 1, &[120, 400], 50_000, 200, evalue, cutoffs).unwrap()
    }

    #[test]
    fn test_cutoff_and_evalue_gates_agree() {
        let by_evalue = model(1e-3, false);
        let by_cutoff = model(1e-3, true);
        let cutoff = by_cutoff.cutoff_score(0).unwrap();
        assert!(by_evalue.cutoff_score(0).is_none());
        assert!(by_cutoff.passes(0, cutoff, 120, 300));
        assert!(!by_cutoff.passes(0, cutoff - 1, 120, 300));
        assert!(by_evalue.passes(0, cutoff, 120, 300));
        assert!(!by_evalue.passes(0, cutoff - 1, 120, 300));
    }

    #[test]
    fn test_longer_query_needs_higher_score() {
        let stats = model(10.0, true);
        assert!(stats.cutoff_score(1).unwrap() >= stats.cutoff_score(0).unwrap());
    }

    #[test]
    fn test_unsupported_costs_fail_setup() {
        let err = KarlinStatistics::new(ScoringMatrix::Blosum62, 0, 0, &[100], 1000, 10, 10.0, false).unwrap_err();
        assert!(err.to_string().contains("BLOSUM62"));
    }
}
