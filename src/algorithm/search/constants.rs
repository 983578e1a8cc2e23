//! Constants for the hit pipeline

use crate::simd::WORD_LANES;

/// Word-lane groups collected by the ungapped stage before forwarding, so
/// the banded stage runs with full lanes.
pub const FORWARD_QUOTA: usize = 4;

/// Candidate pairs forwarded by the ungapped stage at once
pub const FORWARD_BATCH: usize = FORWARD_QUOTA * WORD_LANES;

/// Diagonals per dedup bucket when the collection is small
pub const DIAGONALS_PER_BUCKET: usize = 8;

/// Upper bound on dedup buckets
pub const MAX_DEDUP_BUCKETS: usize = 1 << 18;

/// Shards of the alignment container, each with its own lock
pub const CONTAINER_SHARDS: usize = 256;
