//! Alignment container: dedup, shrink, ordering and limits

use lasp::algorithm::search::{AlignmentContainer, AlignmentVisitor};
use lasp::common::Alignment;

use super::helpers::make_alignment;

#[test]
fn test_identical_ranges_insert_once() {
    let container = AlignmentContainer::new(None);
    let first = container.insert(make_alignment(2, 9, (5, 80), (100, 176), 120));
    let second = container.insert(make_alignment(2, 9, (5, 80), (100, 176), 120));
    assert_eq!((first, second), (true, false));
    assert_eq!(container.len(), 1);
}

#[test]
fn test_shrink_keeps_longer_alignment() {
    let mut container = AlignmentContainer::new(None);
    container.insert(make_alignment(0, 1, (100, 400), (150, 452), 500));
    // Sticks out by 2 residues on the left, within 71 / 20 = 3
    container.insert(make_alignment(0, 1, (98, 167), (148, 218), 110));
    assert_eq!(container.shrink(20), 1);
    let left = container.alignments();
    assert_eq!(left.len(), 1);
    assert_eq!((left[0].q_start, left[0].q_end), (100, 400));
}

#[test]
fn test_shrink_keeps_distinct_alignments() {
    let mut container = AlignmentContainer::new(None);
    container.insert(make_alignment(0, 1, (100, 200), (100, 200), 200));
    container.insert(make_alignment(0, 1, (150, 260), (150, 260), 180));
    container.insert(make_alignment(1, 1, (100, 200), (100, 200), 200));
    assert_eq!(container.shrink(20), 0);
    assert_eq!(container.len(), 3);
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl AlignmentVisitor for Recorder {
    fn visit_query(&mut self, query: u32) -> anyhow::Result<()> {
        self.events.push(format!("q{}", query));
        Ok(())
    }

    fn visit_subject(&mut self, _query: u32, subject: u32) -> anyhow::Result<()> {
        self.events.push(format!("s{}", subject));
        Ok(())
    }

    fn visit_alignment(&mut self, alignment: &Alignment) -> anyhow::Result<()> {
        self.events.push(format!("a{}", alignment.score));
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.events.push("end".to_string());
        Ok(())
    }
}

#[test]
fn test_visitor_order() {
    let mut container = AlignmentContainer::new(None);
    container.insert(make_alignment(1, 3, (0, 50), (0, 50), 60));
    container.insert(make_alignment(0, 4, (0, 50), (0, 50), 70));
    container.insert(make_alignment(0, 2, (0, 50), (0, 50), 90));
    container.insert(make_alignment(0, 2, (60, 90), (60, 90), 45));
    container.sort();
    let mut recorder = Recorder::default();
    container.accept(&mut recorder).unwrap();
    assert_eq!(
        recorder.events,
        vec!["q0", "s2", "a90", "a45", "s4", "a70", "q1", "s3", "a60", "end"]
    );
}

#[test]
fn test_concurrent_inserts_keep_one_copy() {
    let container = AlignmentContainer::new(None);
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for i in 0..50usize {
                    container.insert(make_alignment((i % 5) as u32, 0, (i, i + 30), (i, i + 30), 80));
                }
            });
        }
    });
    assert_eq!(container.len(), 50);
}
