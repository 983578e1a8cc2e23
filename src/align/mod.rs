//! Affine-gap dynamic programming: X-drop extension and banded splitting.

pub mod result;
pub mod splitter;
pub mod traceback;
pub mod xdrop;

pub use result::{aligned_strings, AlignmentStats, EditOp};
pub use splitter::{AlignmentSplitter, SplitAlignment};
pub use xdrop::{ungapped_xdrop, GappedExtension, XDropAligner, XDropExtension};

/// Affine gap costs, both positive. A gap of length `l` costs
/// `open + l * extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapCosts {
    pub open: i32,
    pub extend: i32,
}

impl GapCosts {
    pub fn new(open: i32, extend: i32) -> Self {
        Self { open, extend }
    }
}
