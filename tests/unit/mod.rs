//! Unit test infrastructure for lasp
//!
//! Tests are organized by pipeline component:
//! - `hit_source` - seed enumeration and split equivalence
//! - `dedup` - diagonal range store
//! - `container` - alignment store, shrink and traversal
//! - `extension` - X-drop, splitter and SIMD kernels
//! - `engine` - whole searches

pub mod container;
pub mod dedup;
pub mod engine;
pub mod extension;
pub mod helpers;
pub mod hit_source;
