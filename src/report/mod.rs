//! Output formatting for finished searches

pub mod tabular;

pub use tabular::{format_bit_score, format_evalue, write_alignment, TabularStyle, TabularWriter};
