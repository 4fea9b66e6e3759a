//! Fallback LinkedIn discovery for members whose intro message had no link.
//!
//! Every lookup runs under a deadline. Three nested tiers bound the work:
//!
//! 1. the profile tier (`SearchTimeouts::profile`) reads the member's profile fields,
//! 2. the fallback tier (`SearchTimeouts::fallback`) covers tier 1 plus the member's
//!    recent messages and a lookup by username,
//! 3. the safe tier (`SearchTimeouts::safe`) is the absolute ceiling per member.
//!
//! A deadline drops the in-flight future, so nothing is left armed once a call returns.
//! Errors and timeouts never escape: the caller only ever sees "found" or "not found".

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::config::SearchTimeouts;
use crate::errors::IntroError;
use crate::slack::directory::IntroDirectory;
use crate::utils::links::{extract_linkedin_from_fields, extract_linkedin_url};

/// How many of a member's recent messages are scanned.
pub const RECENT_MESSAGE_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    Profile,
    RecentMessages,
    Username,
    Fallback,
    Safe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found { url: String, tier: SearchTier },
    NotFound,
    TimedOut { tier: SearchTier },
}

impl SearchOutcome {
    #[must_use]
    pub fn into_url(self) -> Option<String> {
        match self {
            SearchOutcome::Found { url, .. } => Some(url),
            SearchOutcome::NotFound | SearchOutcome::TimedOut { .. } => None,
        }
    }
}

pub struct ProfileSearcher<'a> {
    directory: &'a dyn IntroDirectory,
    timeouts: SearchTimeouts,
}

impl<'a> ProfileSearcher<'a> {
    #[must_use]
    pub fn new(directory: &'a dyn IntroDirectory, timeouts: SearchTimeouts) -> Self {
        Self {
            directory,
            timeouts,
        }
    }

    /// Search for a LinkedIn URL, returning `None` on any failure or timeout.
    pub async fn safe_search(&self, user_id: &str, username: &str) -> Option<String> {
        info!(user_id, username, "Starting profile search");

        let outcome = self.search(user_id, username).await;
        match &outcome {
            SearchOutcome::Found { url, tier } => {
                info!(user_id, ?tier, url = url.as_str(), "Profile search found LinkedIn");
            }
            SearchOutcome::NotFound => {
                info!(user_id, "Profile search completed without a LinkedIn URL");
            }
            SearchOutcome::TimedOut { tier } => {
                warn!(user_id, ?tier, "Profile search timed out");
            }
        }

        outcome.into_url()
    }

    /// Run every tier under the absolute ceiling.
    pub async fn search(&self, user_id: &str, username: &str) -> SearchOutcome {
        match timeout(
            self.timeouts.safe,
            self.search_with_fallback(user_id, username),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => SearchOutcome::TimedOut {
                tier: SearchTier::Safe,
            },
        }
    }

    async fn search_with_fallback(&self, user_id: &str, username: &str) -> SearchOutcome {
        let attempt = async {
            let primary = if user_id.is_empty() {
                SearchOutcome::NotFound
            } else {
                match bounded(self.timeouts.profile, self.search_profile(user_id)).await {
                    Ok(Some(url)) => {
                        return SearchOutcome::Found {
                            url,
                            tier: SearchTier::Profile,
                        };
                    }
                    Ok(None) => SearchOutcome::NotFound,
                    Err(IntroError::Timeout(after)) => {
                        warn!(user_id, ?after, "Profile lookup timed out");
                        SearchOutcome::TimedOut {
                            tier: SearchTier::Profile,
                        }
                    }
                    Err(e) => {
                        warn!(user_id, error = %e, "Profile lookup failed");
                        SearchOutcome::NotFound
                    }
                }
            };

            if !user_id.is_empty() {
                match self.search_recent_messages(user_id).await {
                    Ok(Some(url)) => {
                        return SearchOutcome::Found {
                            url,
                            tier: SearchTier::RecentMessages,
                        };
                    }
                    Ok(None) => {}
                    Err(e) => warn!(user_id, error = %e, "Recent message lookup failed"),
                }
            }

            let username = username.trim();
            if !username.is_empty() && username != user_id {
                match self.search_username(username).await {
                    Ok(Some(url)) => {
                        return SearchOutcome::Found {
                            url,
                            tier: SearchTier::Username,
                        };
                    }
                    Ok(None) => {}
                    Err(e) => warn!(username, error = %e, "Username lookup failed"),
                }
            }

            primary
        };

        match timeout(self.timeouts.fallback, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => SearchOutcome::TimedOut {
                tier: SearchTier::Fallback,
            },
        }
    }

    async fn search_profile(&self, user_id: &str) -> Result<Option<String>, IntroError> {
        let Some(profile) = self.directory.find_user_by_id(user_id).await? else {
            debug!(user_id, "No profile returned");
            return Ok(None);
        };

        let fields = profile.searchable_fields();
        debug!(user_id, field_count = fields.len(), "Scanning profile fields");
        Ok(extract_linkedin_from_fields(fields))
    }

    async fn search_recent_messages(&self, user_id: &str) -> Result<Option<String>, IntroError> {
        let messages = self
            .directory
            .recent_messages_from(user_id, RECENT_MESSAGE_LIMIT)
            .await?;
        debug!(user_id, count = messages.len(), "Scanning recent messages");

        Ok(messages.iter().find_map(|msg| {
            extract_linkedin_url(&msg.text)
                .or_else(|| msg.real_name.as_deref().and_then(extract_linkedin_url))
        }))
    }

    async fn search_username(&self, username: &str) -> Result<Option<String>, IntroError> {
        let profile = self.directory.find_user_by_username(username).await?;
        Ok(profile.and_then(|p| extract_linkedin_from_fields(p.searchable_fields())))
    }
}

/// Run `fut` with a deadline, mapping expiry to `IntroError::Timeout`.
///
/// # Errors
///
/// Returns the future's own error, or `Timeout` if the deadline passes first.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, IntroError>
where
    F: Future<Output = Result<T, IntroError>>,
{
    timeout(limit, fut)
        .await
        .map_err(|_| IntroError::Timeout(limit))?
}
