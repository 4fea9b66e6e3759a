//! All Slack-specific functionality

pub mod client;
pub mod directory;
pub mod rate_limit;

// Re-export main types for convenience
pub use client::SlackClient;
pub use directory::{IntroDirectory, SearchQuery};
pub use rate_limit::RateLimiter;
