//! Text helpers shared across the pipeline

pub mod links;
pub mod sanitize;
