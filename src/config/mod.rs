pub mod params;
pub mod scoring;

pub use params::SearchParams;
pub use scoring::ScoringMatrix;
