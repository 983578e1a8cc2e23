pub mod algorithm;
pub mod common;
pub mod error;
pub mod sequence;
pub mod utils;

pub mod align;
pub mod config;
pub mod dispatch;
pub mod report;
pub mod seed;
pub mod simd;
pub mod stats;

pub use algorithm::search::{SearchEngine, SearchOutput};
pub use config::SearchParams;
pub use error::{AlignError, ConfigError};
