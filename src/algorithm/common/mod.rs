//! Modules shared by every search stage
//!
//! - Diagnostic counters for tracking candidates through the pipeline

pub mod diagnostics;
