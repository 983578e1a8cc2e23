//! Error types shared by the search engine.
//!
//! Only [`ConfigError`] aborts a run, and it is always raised during setup,
//! before any worker starts. Per-alignment problems are reported through
//! [`AlignError`] and handled locally by dropping that alignment.

use thiserror::Error;

/// Fatal setup error: the requested parameter combination cannot be run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no statistical parameters for matrix {matrix} with gap costs open={gap_open} extend={gap_extend} \
         (supported open/extend pairs: {supported})"
    )]
    UnsupportedGapCosts {
        matrix: String,
        gap_open: i32,
        gap_extend: i32,
        supported: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("seed model with span {span} over {alphabet} letters exceeds the addressable code space")]
    SeedSpaceTooLarge { span: usize, alphabet: usize },

    #[error("matrix {matrix} is not built in, supply its scores with SearchEngine::with_matrix")]
    MatrixUnavailable { matrix: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Local, per-alignment failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("alignment span {query_span}x{subject_span} exceeds splitter ceiling {max_span}")]
    CapacityExceeded {
        query_span: usize,
        subject_span: usize,
        max_span: usize,
    },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_gap_costs_names_combination() {
        let err = ConfigError::UnsupportedGapCosts {
            matrix: "BLOSUM62".to_string(),
            gap_open: 0,
            gap_extend: 0,
            supported: "11/1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("BLOSUM62"));
        assert!(msg.contains("open=0"));
        assert!(msg.contains("extend=0"));
    }
}
