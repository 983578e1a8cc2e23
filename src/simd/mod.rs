//! Lane-parallel scoring used by the ungapped and small-gap stages.

pub mod kernels;
pub mod lanes;

pub use kernels::{banded_scores, byte_ceiling, ungapped_scores, BandGeometry};
pub use lanes::{LaneBackend, BYTE_LANES, WORD_LANES};
