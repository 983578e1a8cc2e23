//! Diagnostic counters for the hit pipeline
//!
//! Tracks where candidates are lost between stages. Counters are shared by
//! every pipe instance of a run, so all fields are atomics updated with
//! relaxed ordering. The summary is logged when `LASP_DIAGNOSTICS=1` or the
//! binary is started with `--diagnostics`.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("LASP_DIAGNOSTICS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Input/output/duplicate counts for one extension stage.
#[derive(Default, Debug)]
pub struct StageCounters {
    pub input: AtomicUsize,
    pub output: AtomicUsize,
    pub duplicates: AtomicUsize,
}

impl StageCounters {
    #[inline]
    pub fn add_input(&self, n: usize) {
        self.input.fetch_add(n, AtomicOrdering::Relaxed);
    }

    #[inline]
    pub fn add_output(&self, n: usize) {
        self.output.fetch_add(n, AtomicOrdering::Relaxed);
    }

    #[inline]
    pub fn add_duplicates(&self, n: usize) {
        self.duplicates.fetch_add(n, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            input: self.input.load(AtomicOrdering::Relaxed),
            output: self.output.load(AtomicOrdering::Relaxed),
            duplicates: self.duplicates.load(AtomicOrdering::Relaxed),
        }
    }
}

/// Counters for one search run
#[derive(Default, Debug)]
pub struct PipelineCounters {
    // Seed stage
    pub seeds_visited: AtomicUsize,
    pub hits: AtomicUsize,
    pub candidate_pairs: AtomicUsize,
    // Extension stages
    pub ungapped: StageCounters,
    pub small_gap: StageCounters,
    pub full_gap: StageCounters,
    // Gate and container
    pub gate_failed: AtomicUsize,
    pub capacity_exceeded: AtomicUsize,
    pub inserted: AtomicUsize,
    pub container_duplicates: AtomicUsize,
}

/// Plain copy of [`StageCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSnapshot {
    pub input: usize,
    pub output: usize,
    pub duplicates: usize,
}

/// Plain copy of [`PipelineCounters`] handed to callers after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub seeds_visited: usize,
    pub hits: usize,
    pub candidate_pairs: usize,
    pub ungapped: StageSnapshot,
    pub small_gap: StageSnapshot,
    pub full_gap: StageSnapshot,
    pub gate_failed: usize,
    pub capacity_exceeded: usize,
    pub inserted: usize,
    pub container_duplicates: usize,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            seeds_visited: self.seeds_visited.load(AtomicOrdering::Relaxed),
            hits: self.hits.load(AtomicOrdering::Relaxed),
            candidate_pairs: self.candidate_pairs.load(AtomicOrdering::Relaxed),
            ungapped: self.ungapped.snapshot(),
            small_gap: self.small_gap.snapshot(),
            full_gap: self.full_gap.snapshot(),
            gate_failed: self.gate_failed.load(AtomicOrdering::Relaxed),
            capacity_exceeded: self.capacity_exceeded.load(AtomicOrdering::Relaxed),
            inserted: self.inserted.load(AtomicOrdering::Relaxed),
            container_duplicates: self.container_duplicates.load(AtomicOrdering::Relaxed),
        }
    }

    /// Log a summary of all counters
    pub fn log_summary(&self) {
        let s = self.snapshot();
        log::info!("=== Pipeline Diagnostics ===");
        log::info!("Seed Stage:");
        log::info!("  Seeds visited:              {}", s.seeds_visited);
        log::info!("  Hits (shared seeds):        {}", s.hits);
        log::info!("  Candidate pairs:            {}", s.candidate_pairs);
        for (name, stage) in [
            ("Ungapped", s.ungapped),
            ("Small gap", s.small_gap),
            ("Full gap", s.full_gap),
        ] {
            log::info!("{} Stage:", name);
            log::info!("  Input pairs:                {}", stage.input);
            log::info!("  Forwarded:                  {}", stage.output);
            log::info!("  Suppressed (duplicate):     {}", stage.duplicates);
            if stage.input > 0 {
                log::info!(
                    "  Survival rate:              {:.2}%",
                    100.0 * stage.output as f64 / stage.input as f64
                );
            }
        }
        log::info!("Gate and Output:");
        log::info!("  Failed significance gate:   {}", s.gate_failed);
        log::info!("  Dropped (span too large):   {}", s.capacity_exceeded);
        log::info!("  Rejected by container:      {}", s.container_duplicates);
        log::info!("  Alignments inserted:        {}", s.inserted);
    }
}
