use crate::error::{ConfigError, Result};

use super::scoring::ScoringMatrix;

/// Read-only parameters of one search run.
#[derive(Debug, Clone)]
pub struct SearchParams {
    // Scoring
    pub matrix: ScoringMatrix,
    pub gap_open: i32,
    pub gap_extend: i32,

    // Seeds
    pub seed_span: usize,
    pub seed_alphabet: usize,
    /// Fraction of the seed space to iterate (1.0 = all seeds)
    pub seeds_use_ratio: f64,
    /// Per-seed occurrence cap on each side, 0 = unlimited
    pub max_occurrences_per_seed: usize,
    /// Maximum occurrences per side in one Hit; larger seeds are sub-batched
    pub batch_size: usize,
    /// Reorder seeds by descending occurrence product before splitting
    pub reorder_seeds: bool,

    // Ungapped filter
    pub ungap_neighbourhood: usize,
    pub ungap_score_threshold: i32,

    // Banded small-gap filter
    pub small_gap_neighbourhood: usize,
    pub small_gap_band_width: usize,
    pub small_gap_threshold: i32,

    // X-drop
    pub xdrop_ungapped: i32,
    pub xdrop_gapped: i32,
    pub xdrop_final: i32,

    // Significance
    pub evalue: f64,
    /// Gate on precomputed per-query cutoff scores instead of per-candidate E-values
    pub use_cutoff_table: bool,

    // Resources
    /// Subject residues indexed at once, 0 = whole collection
    pub max_database_size: usize,
    /// Worker threads, 0 = all cores
    pub num_threads: usize,

    // Alignment refinement and container
    pub splitter_max_span: usize,
    pub splitter_band_margin: usize,
    pub shrink_shift_divisor: usize,
    /// Reject inserts overlapping an accepted alignment by at least this fraction
    pub overlap_fraction: Option<f64>,
    pub keep_aligned_strings: bool,

    // Output limits, 0 = unlimited
    pub max_hits_per_query: usize,
    pub max_hsps_per_hit: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            matrix: ScoringMatrix::Blosum62,
            gap_open: 11,
            gap_extend: 1,
            seed_span: 4,
            seed_alphabet: 20,
            seeds_use_ratio: 1.0,
            max_occurrences_per_seed: 0,
            batch_size: 20_000,
            reorder_seeds: true,
            ungap_neighbourhood: 22,
            ungap_score_threshold: 38,
            small_gap_neighbourhood: 32,
            small_gap_band_width: 8,
            small_gap_threshold: 46,
            xdrop_ungapped: 20,
            xdrop_gapped: 38,
            xdrop_final: 65,
            evalue: 10.0,
            use_cutoff_table: false,
            max_database_size: 20_000_000,
            num_threads: 0,
            splitter_max_span: 10_000,
            splitter_band_margin: 16,
            shrink_shift_divisor: 20,
            overlap_fraction: None,
            keep_aligned_strings: false,
            max_hits_per_query: 500,
            max_hsps_per_hit: 0,
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl SearchParams {
    /// Reject parameter values no stage can run with.
    pub fn validate(&self) -> Result<()> {
        if self.gap_open < 0 || self.gap_extend < 0 {
            return Err(invalid("gap_costs", "gap costs must not be negative"));
        }
        if self.seed_span == 0 {
            return Err(invalid("seed_span", "must be at least 1"));
        }
        if self.seed_alphabet == 0 || self.seed_alphabet > 20 {
            return Err(invalid("seed_alphabet", "must be within 1..=20"));
        }
        if !(self.seeds_use_ratio > 0.0 && self.seeds_use_ratio <= 1.0) {
            return Err(invalid("seeds_use_ratio", "must be within (0, 1]"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.ungap_neighbourhood == 0 || self.small_gap_neighbourhood == 0 {
            return Err(invalid("neighbourhood", "neighbourhood lengths must be at least 1"));
        }
        if self.ungap_score_threshold <= 0 {
            return Err(invalid("ungap_score_threshold", "must be positive"));
        }
        if self.small_gap_threshold <= 0 {
            return Err(invalid("small_gap_threshold", "must be positive"));
        }
        if self.xdrop_ungapped <= 0 || self.xdrop_gapped <= 0 || self.xdrop_final <= 0 {
            return Err(invalid("xdrop", "X-drop values must be positive"));
        }
        if self.xdrop_final < self.xdrop_gapped {
            return Err(invalid(
                "xdrop_final",
                format!("{} is below the gapped X-drop {}", self.xdrop_final, self.xdrop_gapped),
            ));
        }
        if !(self.evalue > 0.0) {
            return Err(invalid("evalue", "must be positive"));
        }
        if self.splitter_max_span == 0 {
            return Err(invalid("splitter_max_span", "must be at least 1"));
        }
        if self.shrink_shift_divisor == 0 {
            return Err(invalid("shrink_shift_divisor", "must be at least 1"));
        }
        if let Some(f) = self.overlap_fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err(invalid("overlap_fraction", "must be within (0, 1]"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SearchParams::default().validate().is_ok());
    }

    #[test]
    fn test_validation_names_parameter() {
        let params = SearchParams {
            seeds_use_ratio: 0.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("seeds_use_ratio"));

        let params = SearchParams {
            xdrop_final: 10,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
