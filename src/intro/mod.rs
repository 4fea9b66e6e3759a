//! Intro detection: classification, naming, fallback search and per-user merging

pub mod aggregator;
pub mod classifier;
pub mod names;
pub mod profile_search;

pub use aggregator::IntroAggregator;
pub use classifier::is_intro_message;
pub use names::resolve_first_name;
pub use profile_search::ProfileSearcher;
