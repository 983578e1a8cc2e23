//! Seed-and-extend protein search
//!
//! Seeds shared by the subject and query indices become Hits, which flow
//! through three extension stages of increasing cost (ungapped window,
//! banded small-gap, full X-drop) before alignments land in the container.
//! The seed space is split up front into one independent pipe per worker.

pub mod args;
pub mod constants;
pub mod container;
pub mod context;
pub mod dedup;
pub mod engine;
#[cfg(test)]
pub(crate) mod fixture;
pub mod full_gap;
pub mod hit;
pub mod hit_source;
pub mod pipe;
mod run;
pub mod small_gap;
pub mod ungapped;

pub use args::SearchArgs;
pub use container::{AlignmentContainer, AlignmentVisitor, CollectingVisitor};
pub use dedup::DiagonalDedup;
pub use engine::{SearchEngine, SearchOutput};
pub use hit::{CandidatePair, Hit};
pub use hit_source::{HitCounters, HitSource, HitSourceConfig, HitSourceState};
pub use run::run;
