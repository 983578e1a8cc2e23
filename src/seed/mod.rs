pub mod index;
pub mod model;

pub use index::{Neighborhood, OccurrenceIter, PartialIndex, SeedIndex, SeedOccurrence};
pub use model::{SeedCode, SeedModel};
