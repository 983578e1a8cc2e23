//! Diagonal range store

use lasp::algorithm::search::DiagonalDedup;

#[test]
fn test_containment_lookup() {
    let dedup = DiagonalDedup::new(5_000, 5_000);
    assert!(!dedup.insert(10, 20, 7));
    assert!(dedup.exists(15, 7));
    assert!(!dedup.exists(25, 7));
    assert!(!dedup.exists(15, -7));
}

#[test]
fn test_double_insert_changes_state_once() {
    let dedup = DiagonalDedup::new(5_000, 5_000);
    assert!(!dedup.insert(300, 340, -120));
    assert!(dedup.insert(300, 340, -120));
    assert_eq!(dedup.len(), 1);
    for pos in 300..=340 {
        assert!(dedup.exists(pos, -120), "position {} not covered", pos);
    }
}

#[test]
fn test_band_lookup_crosses_bucket_boundaries() {
    let dedup = DiagonalDedup::new(100_000, 100_000);
    assert!(dedup.bucket_count() > 100);
    dedup.insert(1_000, 1_100, 17);
    assert!(dedup.exists_within(1_050, 15, 2));
    assert!(!dedup.exists_within(1_050, 14, 2));
    assert!(!dedup.exists_within(1_101, 17, 2));
}

#[test]
fn test_reversed_bounds_are_normalised() {
    let dedup = DiagonalDedup::new(1_000, 1_000);
    assert!(!dedup.insert(60, 40, 0));
    assert!(dedup.exists(50, 0));
    assert!(!dedup.is_empty());
}
