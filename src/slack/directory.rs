use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::models::{ChannelMessage, UserProfile};
use crate::errors::IntroError;

/// A channel search expressed in Slack's search modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub channel: String,
    /// Exclusive lower date bound (`after:`).
    pub after: Option<NaiveDate>,
    /// Exclusive upper date bound (`before:`).
    pub before: Option<NaiveDate>,
    pub limit: u32,
}

impl SearchQuery {
    /// Render as a `search.messages` query string.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use intros::slack::directory::SearchQuery;
    ///
    /// let q = SearchQuery {
    ///     channel: "intros".into(),
    ///     after: NaiveDate::from_ymd_opt(2025, 9, 30),
    ///     before: None,
    ///     limit: 100,
    /// };
    /// assert_eq!(q.to_query_string(), "in:#intros after:2025-09-30");
    /// ```
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![format!("in:#{}", self.channel.trim_start_matches('#'))];
        if let Some(after) = self.after {
            parts.push(format!("after:{}", after.format("%Y-%m-%d")));
        }
        if let Some(before) = self.before {
            parts.push(format!("before:{}", before.format("%Y-%m-%d")));
        }
        parts.join(" ")
    }
}

/// Message search and user lookup against the workspace.
#[async_trait]
pub trait IntroDirectory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the search cannot be executed at all.
    async fn search_messages(&self, query: &SearchQuery)
    -> Result<Vec<ChannelMessage>, IntroError>;

    /// # Errors
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, IntroError>;

    /// # Errors
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, IntroError>;

    /// Most recent messages authored by `user_id`, newest first.
    ///
    /// # Errors
    async fn recent_messages_from(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ChannelMessage>, IntroError>;
}
