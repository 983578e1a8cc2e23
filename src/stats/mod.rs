pub mod karlin;
pub mod length_adjustment;
pub mod model;
pub mod search_space;
pub mod tables;

pub use karlin::*;
pub use length_adjustment::*;
pub use model::{KarlinStatistics, StatisticsModel};
pub use search_space::*;
pub use tables::*;
