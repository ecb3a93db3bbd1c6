pub mod budget;
pub mod snapshot;
