//! Whole searches through the engine

use std::collections::BTreeSet;

use lasp::config::{ScoringMatrix, SearchParams};
use lasp::{ConfigError, SearchEngine};

use super::helpers::{planted_pair, search_params};

fn pair_set(params: SearchParams, seed: u64) -> BTreeSet<(u32, u32)> {
    let (query, subject) = planted_pair(seed, 120);
    let mut output = SearchEngine::new(params).unwrap().run(query, subject).unwrap();
    output
        .container
        .alignments()
        .iter()
        .map(|a| (a.query, a.subject))
        .collect()
}

#[test]
fn test_planted_homolog_is_found() {
    let (query, subject) = planted_pair(7, 120);
    let engine = SearchEngine::new(search_params(2)).unwrap();
    let mut output = engine.run(query, subject).unwrap();
    assert!(!output.cancelled);

    let alignments = output.container.alignments();
    let best = alignments
        .iter()
        .find(|a| a.query == 0 && a.subject == 0)
        .expect("planted homolog not reported");
    assert!(best.evalue < 1e-20, "evalue {}", best.evalue);
    assert!(best.q_start <= 10 && best.q_end >= 109, "query range {}..{}", best.q_start, best.q_end);
    assert_eq!(best.s_start as i64 - best.q_start as i64, 60);
    assert!(best.stats.identity() > 80.0);
    assert!(best.stats.length >= best.query_span().max(best.subject_span()));

    let counters = output.counters;
    assert!(counters.hits > 0);
    assert!(counters.ungapped.input >= counters.ungapped.output);
    assert!(counters.small_gap.input >= counters.small_gap.output);
    assert!(counters.inserted >= 1);
}

#[test]
fn test_results_do_not_depend_on_worker_count() {
    for seed in [1, 2] {
        let strict = |threads| SearchParams {
            evalue: 1e-5,
            ..search_params(threads)
        };
        let single = pair_set(strict(1), seed);
        let many = pair_set(strict(4), seed);
        assert_eq!(single, many);
        assert!(single.contains(&(0, 0)));
    }
}

#[test]
fn test_looser_evalue_never_reports_fewer() {
    let count = |evalue: f64| {
        let (query, subject) = planted_pair(5, 120);
        let params = SearchParams {
            evalue,
            ..search_params(1)
        };
        SearchEngine::new(params).unwrap().run(query, subject).unwrap().counters.inserted
    };
    let strict = count(1e-30);
    let loose = count(10.0);
    assert!(strict >= 1);
    assert!(loose >= strict);
}

#[test]
fn test_cancelled_run_returns_partial_output() {
    let (query, subject) = planted_pair(3, 120);
    let engine = SearchEngine::new(search_params(2)).unwrap();
    engine.cancellation_token().cancel();
    let output = engine.run(query, subject).unwrap();
    assert!(output.cancelled);
    assert!(output.container.is_empty());
}

#[test]
fn test_zero_gap_costs_are_rejected_before_search() {
    let (query, subject) = planted_pair(3, 60);
    let params = SearchParams {
        gap_open: 0,
        gap_extend: 0,
        ..search_params(1)
    };
    let err = SearchEngine::new(params).unwrap().run(query, subject).err().unwrap();
    assert!(matches!(err, ConfigError::UnsupportedGapCosts { .. }));
    let msg = err.to_string();
    assert!(msg.contains("BLOSUM62"));
    assert!(msg.contains("open=0"));
}

#[test]
fn test_matrix_without_scores_is_rejected() {
    let (query, subject) = planted_pair(3, 60);
    let params = SearchParams {
        matrix: ScoringMatrix::Blosum80,
        gap_open: 10,
        gap_extend: 1,
        ..search_params(1)
    };
    let err = SearchEngine::new(params).unwrap().run(query, subject).err().unwrap();
    assert!(matches!(err, ConfigError::MatrixUnavailable { .. }));
}

#[test]
fn test_invalid_parameters_fail_at_construction() {
    let params = SearchParams {
        xdrop_gapped: 0,
        ..search_params(1)
    };
    assert!(matches!(
        SearchEngine::new(params).err(),
        Some(ConfigError::InvalidParameter { .. })
    ));
}
