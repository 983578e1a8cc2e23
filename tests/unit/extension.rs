//! Extension primitives: X-drop, splitter and lane kernels

use lasp::align::{AlignmentSplitter, GapCosts, XDropAligner};
use lasp::simd::{banded_scores, ungapped_scores, BandGeometry, LaneBackend, BYTE_LANES, WORD_LANES};
use lasp::utils::matrix::{encode_sequence, ScoreMatrix};
use rand::Rng;

use super::helpers::{mutate, random_protein, rng};

const GAPS: GapCosts = GapCosts { open: 11, extend: 1 };

#[test]
fn test_xdrop_ladder_score_grows_with_x() {
    let matrix = ScoreMatrix::blosum62();
    let mut aligner = XDropAligner::new();
    for seed in 0..40 {
        let mut rng = rng(seed);
        let core = random_protein(&mut rng, 90);
        let query = encode_sequence(format!("{}{}", random_protein(&mut rng, 20), core).as_bytes());
        let homolog = mutate(&mut rng, &core, 0.25);
        let subject = encode_sequence(format!("{}{}", random_protein(&mut rng, 35), homolog).as_bytes());
        let (qa, sa) = (20 + 45, 35 + 45);

        let mut best = None;
        let mut previous = 0;
        for x in 1..=60 {
            best = match best {
                Some(ext) => Some(aligner.widen(&query, &subject, qa, sa, &ext, &matrix, GAPS, x)),
                None => aligner.extend(&query, &subject, qa, sa, &matrix, GAPS, x),
            };
            let score = best.map_or(0, |e| e.score);
            assert!(score >= previous, "seed {}: x={} gave {} < {}", seed, x, score, previous);

            let single = aligner
                .extend(&query, &subject, qa, sa, &matrix, GAPS, x)
                .map_or(0, |e| e.score);
            assert!(score >= single, "seed {}: x={} ladder {} < single {}", seed, x, score, single);
            previous = score;
        }

        let ladder: Vec<i32> = (1..=60).collect();
        let folded = aligner.extend_ladder(&query, &subject, qa, sa, &matrix, GAPS, &ladder);
        assert_eq!(folded, best, "seed {}", seed);
    }
}

#[test]
fn test_splitter_identity_on_equal_strings() {
    let matrix = ScoreMatrix::blosum62();
    let mut splitter = AlignmentSplitter::new(10_000, 16);
    let mut rng = rng(11);
    for len in [1, 7, 64, 300] {
        let seq = encode_sequence(random_protein(&mut rng, len).as_bytes());
        let split = splitter.split(&seq, &seq, &matrix, GAPS, true).unwrap();
        assert_eq!(split.stats.length, len);
        assert_eq!(split.stats.identities, len);
        assert_eq!(split.stats.mismatches, 0);
        assert_eq!(split.stats.gaps(), 0);
        let (q, s) = split.aligned.unwrap();
        assert_eq!(q, s);
        assert!(!q.contains('-'));
    }
}

#[test]
fn test_splitter_rejects_oversized_span() {
    let matrix = ScoreMatrix::blosum62();
    let mut splitter = AlignmentSplitter::new(50, 8);
    let seq = encode_sequence(random_protein(&mut rng(3), 51).as_bytes());
    assert!(splitter.split(&seq, &seq, &matrix, GAPS, false).is_err());
    // The splitter stays usable after a rejection
    assert!(splitter.split(&seq[..50], &seq[..50], &matrix, GAPS, false).is_ok());
}

#[test]
fn test_detected_lanes_match_scalar_lanes() {
    let matrix = ScoreMatrix::blosum62();
    let biased = matrix.biased_table();
    let words = matrix.word_table();
    let native = LaneBackend::detect();
    let mut rng = rng(99);

    for round in 0..20 {
        let width = 20 + round;
        let count = 1 + rng.gen_range(0..BYTE_LANES);
        let subjects: Vec<Vec<u8>> = (0..count)
            .map(|_| encode_sequence(random_protein(&mut rng, width).as_bytes()))
            .collect();
        let queries: Vec<Vec<u8>> = subjects.iter().map(|s| {
            let ascii: String = s.iter().map(|&c| lasp::utils::matrix::decode_residue(c) as char).collect();
            encode_sequence(mutate(&mut rng, &ascii, 0.4).as_bytes())
        }).collect();
        let s: Vec<&[u8]> = subjects.iter().map(Vec::as_slice).collect();
        let q: Vec<&[u8]> = queries.iter().map(Vec::as_slice).collect();
        assert_eq!(
            ungapped_scores(native, &biased, matrix.bias(), &s, &q, width),
            ungapped_scores(LaneBackend::Scalar, &biased, matrix.bias(), &s, &q, width),
        );

        let geometry = BandGeometry {
            query_len: width,
            band: 4,
            gap_open: 11,
            gap_extend: 1,
        };
        let count = 1 + rng.gen_range(0..WORD_LANES);
        let bq: Vec<Vec<u8>> = (0..count)
            .map(|_| encode_sequence(random_protein(&mut rng, geometry.query_len).as_bytes()))
            .collect();
        let bs: Vec<Vec<u8>> = (0..count)
            .map(|_| encode_sequence(random_protein(&mut rng, geometry.subject_len()).as_bytes()))
            .collect();
        let bq: Vec<&[u8]> = bq.iter().map(Vec::as_slice).collect();
        let bs: Vec<&[u8]> = bs.iter().map(Vec::as_slice).collect();
        assert_eq!(
            banded_scores(native, &words, &bq, &bs, geometry),
            banded_scores(LaneBackend::Scalar, &words, &bq, &bs, geometry),
        );
    }
}
