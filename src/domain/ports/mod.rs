pub mod classifier;
pub mod journal_store;
pub mod post_source;
