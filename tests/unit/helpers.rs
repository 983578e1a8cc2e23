//! Test utilities and helpers for unit tests
//!
//! - Random protein generators with planted homologies
//! - Alignment fixtures for container tests
//! - Small search parameter sets that keep runs fast

use std::sync::Arc;

use lasp::align::AlignmentStats;
use lasp::common::Alignment;
use lasp::config::SearchParams;
use lasp::dispatch::Dispatcher;
use lasp::seed::{SeedIndex, SeedModel};
use lasp::sequence::SequenceDatabase;
use lasp::utils::matrix::ALPHABET;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random sequence over the 20 standard residues.
pub fn random_protein(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| ALPHABET[rng.gen_range(0..20)] as char).collect()
}

/// Copy of `seq` with roughly `rate` of its residues substituted.
pub fn mutate(rng: &mut StdRng, seq: &str, rate: f64) -> String {
    seq.chars()
        .map(|c| {
            if rng.gen_bool(rate) {
                ALPHABET[rng.gen_range(0..20)] as char
            } else {
                c
            }
        })
        .collect()
}

/// Query 0 is `core`; subject 0 embeds a lightly mutated copy of it between
/// random flanks. Every other sequence is unrelated.
pub fn planted_pair(seed: u64, core_len: usize) -> (Arc<SequenceDatabase>, Arc<SequenceDatabase>) {
    let mut rng = rng(seed);
    let core = random_protein(&mut rng, core_len);
    let homolog = mutate(&mut rng, &core, 0.1);
    let subject0 = format!(
        "{}{}{}",
        random_protein(&mut rng, 60),
        homolog,
        random_protein(&mut rng, 45)
    );
    let queries = vec![core, random_protein(&mut rng, 150)];
    let subjects = vec![
        subject0,
        random_protein(&mut rng, 200),
        random_protein(&mut rng, 90),
    ];
    (
        Arc::new(SequenceDatabase::from_strings(queries)),
        Arc::new(SequenceDatabase::from_strings(subjects)),
    )
}

/// Default parameters on a fixed, small worker pool.
pub fn search_params(threads: usize) -> SearchParams {
    SearchParams {
        num_threads: threads,
        ..SearchParams::default()
    }
}

pub fn build_index(seqs: &[&str], span: usize) -> SeedIndex {
    let db = Arc::new(SequenceDatabase::from_strings(seqs.iter().copied()));
    let model = SeedModel::new(span, 20).unwrap();
    SeedIndex::build(db, model, &Dispatcher::new(2).unwrap())
}

/// Alignment fixture; bit score and E-value follow from the raw score.
pub fn make_alignment(
    query: u32,
    subject: u32,
    (q_start, q_end): (usize, usize),
    (s_start, s_end): (usize, usize),
    score: i32,
) -> Alignment {
    Alignment {
        query,
        subject,
        q_start,
        q_end,
        s_start,
        s_end,
        score,
        bit_score: score as f64 * 0.3,
        evalue: 1e3 * (-0.3 * score as f64).exp(),
        stats: AlignmentStats::default(),
        query_aligned: None,
        subject_aligned: None,
    }
}
