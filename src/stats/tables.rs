//! Karlin-Altschul parameter tables for protein substitution matrices.
//!
//! Each table starts with the ungapped entry (gap costs `i32::MAX`),
//! followed by the supported (gap open, gap extend) combinations.

use crate::config::ScoringMatrix;
use crate::error::{ConfigError, Result};

/// Karlin-Altschul statistical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KarlinParams {
    pub lambda: f64,
    pub k: f64,
    /// Relative entropy
    pub h: f64,
    pub alpha: f64,
    pub beta: f64,
}

/// (gap_open, gap_extend, lambda, k, h, alpha, beta)
#[derive(Debug, Clone, Copy)]
struct ParamEntry {
    gap_open: i32,
    gap_extend: i32,
    params: KarlinParams,
}

impl ParamEntry {
    const fn new(gap_open: i32, gap_extend: i32, lambda: f64, k: f64, h: f64, alpha: f64, beta: f64) -> Self {
        Self {
            gap_open,
            gap_extend,
            params: KarlinParams {
                lambda,
                k,
                h,
                alpha,
                beta,
            },
        }
    }

    fn is_ungapped(&self) -> bool {
        self.gap_open == i32::MAX
    }
}

/// BLOSUM45 parameters
const BLOSUM45: &[ParamEntry] = &[
    ParamEntry::new(i32::MAX, i32::MAX, 0.2291, 0.0924, 0.2514, 0.9113, -5.7),
    ParamEntry::new(13, 3, 0.207, 0.049, 0.14, 1.5, -22.0),
    ParamEntry::new(12, 3, 0.199, 0.039, 0.11, 1.8, -34.0),
    ParamEntry::new(11, 3, 0.190, 0.031, 0.095, 2.0, -38.0),
    ParamEntry::new(10, 3, 0.179, 0.023, 0.075, 2.4, -51.0),
    ParamEntry::new(16, 2, 0.210, 0.051, 0.14, 1.5, -24.0),
    ParamEntry::new(15, 2, 0.203, 0.041, 0.12, 1.7, -31.0),
    ParamEntry::new(14, 2, 0.195, 0.032, 0.10, 1.9, -36.0),
    ParamEntry::new(13, 2, 0.185, 0.024, 0.084, 2.2, -45.0),
    ParamEntry::new(12, 2, 0.171, 0.016, 0.061, 2.8, -65.0),
    ParamEntry::new(19, 1, 0.205, 0.040, 0.11, 1.9, -43.0),
    ParamEntry::new(18, 1, 0.198, 0.032, 0.10, 2.0, -43.0),
    ParamEntry::new(17, 1, 0.189, 0.024, 0.079, 2.4, -57.0),
    ParamEntry::new(16, 1, 0.176, 0.016, 0.063, 2.8, -67.0),
];

/// BLOSUM50 parameters
const BLOSUM50: &[ParamEntry] = &[
    ParamEntry::new(i32::MAX, i32::MAX, 0.2318, 0.112, 0.3362, 0.6895, -4.0),
    ParamEntry::new(13, 3, 0.212, 0.063, 0.19, 1.1, -16.0),
    ParamEntry::new(12, 3, 0.206, 0.055, 0.17, 1.2, -18.0),
    ParamEntry::new(11, 3, 0.197, 0.042, 0.14, 1.4, -25.0),
    ParamEntry::new(10, 3, 0.186, 0.031, 0.11, 1.7, -34.0),
    ParamEntry::new(9, 3, 0.172, 0.022, 0.082, 2.1, -48.0),
    ParamEntry::new(16, 2, 0.215, 0.066, 0.20, 1.05, -15.0),
    ParamEntry::new(15, 2, 0.210, 0.058, 0.17, 1.2, -20.0),
    ParamEntry::new(14, 2, 0.202, 0.045, 0.14, 1.4, -27.0),
    ParamEntry::new(13, 2, 0.193, 0.035, 0.12, 1.6, -32.0),
    ParamEntry::new(12, 2, 0.181, 0.025, 0.095, 1.9, -41.0),
    ParamEntry::new(19, 1, 0.212, 0.057, 0.18, 1.2, -21.0),
    ParamEntry::new(18, 1, 0.207, 0.050, 0.15, 1.4, -28.0),
    ParamEntry::new(17, 1, 0.198, 0.037, 0.12, 1.6, -33.0),
    ParamEntry::new(16, 1, 0.186, 0.025, 0.10, 1.9, -42.0),
    ParamEntry::new(15, 1, 0.171, 0.015, 0.063, 2.7, -76.0),
];

/// BLOSUM62 parameters
const BLOSUM62: &[ParamEntry] = &[
    ParamEntry::new(i32::MAX, i32::MAX, 0.3176, 0.134, 0.4012, 0.7916, -3.2),
    ParamEntry::new(11, 2, 0.297, 0.082, 0.27, 1.1, -10.0),
    ParamEntry::new(10, 2, 0.291, 0.075, 0.23, 1.3, -15.0),
    ParamEntry::new(9, 2, 0.279, 0.058, 0.19, 1.5, -19.0),
    ParamEntry::new(8, 2, 0.264, 0.045, 0.15, 1.8, -26.0),
    ParamEntry::new(7, 2, 0.239, 0.027, 0.10, 2.5, -46.0),
    ParamEntry::new(6, 2, 0.201, 0.012, 0.061, 3.3, -58.0),
    ParamEntry::new(13, 1, 0.292, 0.071, 0.23, 1.2, -11.0),
    ParamEntry::new(12, 1, 0.283, 0.059, 0.19, 1.5, -19.0),
    ParamEntry::new(11, 1, 0.267, 0.041, 0.14, 1.9, -30.0),
    ParamEntry::new(10, 1, 0.243, 0.024, 0.10, 2.5, -44.0),
    ParamEntry::new(9, 1, 0.206, 0.010, 0.052, 4.0, -87.0),
];

/// BLOSUM80 parameters
const BLOSUM80: &[ParamEntry] = &[
    ParamEntry::new(i32::MAX, i32::MAX, 0.3430, 0.177, 0.6568, 0.5222, -1.6),
    ParamEntry::new(25, 2, 0.342, 0.17, 0.66, 0.52, -1.6),
    ParamEntry::new(13, 2, 0.336, 0.15, 0.57, 0.59, -3.0),
    ParamEntry::new(9, 2, 0.319, 0.11, 0.42, 0.76, -6.0),
    ParamEntry::new(8, 2, 0.308, 0.090, 0.35, 0.89, -9.0),
    ParamEntry::new(7, 2, 0.293, 0.070, 0.27, 1.1, -14.0),
    ParamEntry::new(6, 2, 0.268, 0.045, 0.19, 1.4, -19.0),
    ParamEntry::new(11, 1, 0.314, 0.095, 0.35, 0.90, -9.0),
    ParamEntry::new(10, 1, 0.299, 0.071, 0.27, 1.1, -14.0),
    ParamEntry::new(9, 1, 0.279, 0.048, 0.20, 1.4, -19.0),
];

/// BLOSUM90 parameters
const BLOSUM90: &[ParamEntry] = &[
    ParamEntry::new(i32::MAX, i32::MAX, 0.3346, 0.190, 0.7547, 0.4434, -1.4),
    ParamEntry::new(9, 2, 0.310, 0.12, 0.46, 0.67, -6.0),
    ParamEntry::new(8, 2, 0.300, 0.099, 0.39, 0.76, -7.0),
    ParamEntry::new(7, 2, 0.283, 0.072, 0.30, 0.93, -11.0),
    ParamEntry::new(6, 2, 0.259, 0.048, 0.22, 1.2, -16.0),
    ParamEntry::new(11, 1, 0.302, 0.093, 0.39, 0.78, -8.0),
    ParamEntry::new(10, 1, 0.290, 0.075, 0.28, 1.04, -15.0),
    ParamEntry::new(9, 1, 0.265, 0.044, 0.20, 1.3, -19.0),
];

fn table_for(matrix: ScoringMatrix) -> &'static [ParamEntry] {
    match matrix {
        ScoringMatrix::Blosum45 => BLOSUM45,
        ScoringMatrix::Blosum50 => BLOSUM50,
        ScoringMatrix::Blosum62 => BLOSUM62,
        ScoringMatrix::Blosum80 => BLOSUM80,
        ScoringMatrix::Blosum90 => BLOSUM90,
    }
}

/// Gap cost combinations with gapped parameters for `matrix`.
pub fn supported_gap_costs(matrix: ScoringMatrix) -> Vec<(i32, i32)> {
    table_for(matrix)
        .iter()
        .filter(|e| !e.is_ungapped())
        .map(|e| (e.gap_open, e.gap_extend))
        .collect()
}

/// Gapped parameters for an exact (matrix, gap open, gap extend) match.
///
/// A combination without a table entry is a configuration error naming the
/// matrix, the requested costs, and the supported alternatives.
pub fn lookup_gapped_params(matrix: ScoringMatrix, gap_open: i32, gap_extend: i32) -> Result<KarlinParams> {
    table_for(matrix)
        .iter()
        .find(|e| !e.is_ungapped() && e.gap_open == gap_open && e.gap_extend == gap_extend)
        .map(|e| e.params)
        .ok_or_else(|| ConfigError::UnsupportedGapCosts {
            matrix: matrix.name().to_string(),
            gap_open,
            gap_extend,
            supported: supported_gap_costs(matrix)
                .iter()
                .map(|(o, e)| format!("{}/{}", o, e))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Ungapped parameters (first table entry).
pub fn lookup_ungapped_params(matrix: ScoringMatrix) -> KarlinParams {
    table_for(matrix)[0].params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_blosum62_default() {
        let p = lookup_gapped_params(ScoringMatrix::Blosum62, 11, 1).unwrap();
        assert!((p.lambda - 0.267).abs() < 1e-9);
        assert!((p.k - 0.041).abs() < 1e-9);
        let u = lookup_ungapped_params(ScoringMatrix::Blosum62);
        assert!((u.lambda - 0.3176).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gap_costs_are_rejected() {
        let err = lookup_gapped_params(ScoringMatrix::Blosum62, 0, 0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("BLOSUM62"));
        assert!(msg.contains("open=0 extend=0"));
        assert!(msg.contains("11/1"));
    }

    #[test]
    fn test_supported_costs_exclude_ungapped() {
        let costs = supported_gap_costs(ScoringMatrix::Blosum80);
        assert!(costs.contains(&(10, 1)));
        assert!(costs.iter().all(|&(o, _)| o != i32::MAX));
    }
}
