pub mod classifier;
pub mod journal;
pub mod sources;
