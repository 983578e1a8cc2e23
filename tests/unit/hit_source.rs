//! Seed enumeration: reference hits and split equivalence

use lasp::algorithm::search::{Hit, HitSource, HitSourceConfig, HitSourceState};
use proptest::prelude::*;

use super::helpers::build_index;

fn drain(source: &mut HitSource<'_>) -> Vec<(u64, u64)> {
    let mut hit = Hit::new();
    let mut out = Vec::new();
    while source.next_hit(&mut hit) {
        out.extend(hit.database_offsets());
    }
    out
}

#[test]
fn test_reference_hits_in_order() {
    let subject = build_index(&["AADDPP", "CCFFF"], 3);
    let query = build_index(&["XAAADD", "TTT", "PCFF"], 3);
    let codes = subject.model().codes(1.0);
    let mut source = HitSource::new(&subject, &query, codes, HitSourceConfig::default());
    assert_eq!(source.state(), HitSourceState::NotStarted);

    let hits = drain(&mut source);
    assert_eq!(hits, vec![(0, 2), (1, 3), (7, 10)]);
    assert_eq!(source.state(), HitSourceState::Done);
    assert_eq!(source.counters().hits(), 3);
    assert_eq!(source.counters().pairs(), 3);
}

#[test]
fn test_split_children_share_counters() {
    let subject = build_index(&["AADDPP", "CCFFF"], 3);
    let query = build_index(&["XAAADD", "TTT", "PCFF"], 3);
    let codes = subject.model().codes(1.0);
    let source = HitSource::new(&subject, &query, codes, HitSourceConfig::default());
    let counters = source.counters().clone();
    let mut children = source.split(4, false);
    assert_eq!(children.len(), 4);
    let total: usize = children.iter_mut().map(|c| drain(c).len()).sum();
    assert_eq!(total, 3);
    assert_eq!(counters.hits(), 3);
}

#[test]
fn test_out_of_range_code_is_empty() {
    let subject = build_index(&["AADDPP"], 3);
    let query = build_index(&["AADDPP"], 3);
    let huge = subject.model().code_count() as u32 + 10;
    let mut source = HitSource::new(&subject, &query, vec![huge], HitSourceConfig::default());
    assert!(drain(&mut source).is_empty());
    assert_eq!(subject.occurrence_count(huge), 0);
}

fn protein_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ACDEGKLW]{3,40}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_split_equivalence(
        subjects in proptest::collection::vec(protein_strategy(), 1..5),
        queries in proptest::collection::vec(protein_strategy(), 1..5),
        n in 1usize..7,
        reorder in any::<bool>(),
        batch in 1usize..6,
    ) {
        let s: Vec<&str> = subjects.iter().map(String::as_str).collect();
        let q: Vec<&str> = queries.iter().map(String::as_str).collect();
        let subject = build_index(&s, 2);
        let query = build_index(&q, 2);
        let codes = subject.model().codes(1.0);
        let config = HitSourceConfig { batch_size: batch, ..Default::default() };

        let mut whole = drain(&mut HitSource::new(&subject, &query, codes.clone(), config));

        let mut parent = HitSource::new(&subject, &query, codes, config);
        if reorder {
            parent.reorder_by_load();
        }
        let mut parts: Vec<(u64, u64)> = parent
            .split(n, reorder)
            .iter_mut()
            .flat_map(|child| drain(child))
            .collect();

        whole.sort_unstable();
        parts.sort_unstable();
        prop_assert_eq!(whole, parts);
    }
}
