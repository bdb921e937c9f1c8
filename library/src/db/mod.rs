pub mod actions;
pub mod model;

pub use actions::{build_pool, DbPool};
pub use model::{DbReading, GetReadings, NewReading};
