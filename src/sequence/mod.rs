//! In-memory protein sequence collections
//!
//! A [`SequenceDatabase`] stores all residues of a collection back to back.
//! Offsets "in database" index that concatenation directly (there are no
//! separators between sequences).

pub mod database;

pub use database::*;
