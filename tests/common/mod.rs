#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use intros::core::config::{AppConfig, SearchTimeouts};
use intros::core::models::{ChannelMessage, UserProfile};
use intros::errors::IntroError;
use intros::slack::directory::{IntroDirectory, SearchQuery};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory stand-in for the Slack workspace.
#[derive(Default)]
pub struct FakeDirectory {
    pub messages: Vec<ChannelMessage>,
    pub profiles_by_id: HashMap<String, UserProfile>,
    pub profiles_by_username: HashMap<String, UserProfile>,
    pub recent: HashMap<String, Vec<ChannelMessage>>,
    pub profile_delay: Option<Duration>,
    pub recent_delay: Option<Duration>,
    pub username_delay: Option<Duration>,
    pub fail_search: bool,
    pub fail_profile: bool,
    pub fail_recent: bool,
    pub fail_username: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn with_messages(messages: Vec<ChannelMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

async fn maybe_sleep(delay: Option<Duration>) {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
}

#[async_trait]
impl IntroDirectory for FakeDirectory {
    async fn search_messages(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<ChannelMessage>, IntroError> {
        self.record(format!("search:{}", query.to_query_string()));
        if self.fail_search {
            return Err(IntroError::ApiError("search.messages error: not_authed".into()));
        }
        Ok(self.messages.clone())
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, IntroError> {
        self.record(format!("profile:{user_id}"));
        maybe_sleep(self.profile_delay).await;
        if self.fail_profile {
            return Err(IntroError::ApiError("users.profile.get error: fatal".into()));
        }
        Ok(self.profiles_by_id.get(user_id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, IntroError> {
        self.record(format!("username:{username}"));
        maybe_sleep(self.username_delay).await;
        if self.fail_username {
            return Err(IntroError::HttpError("connection reset".into()));
        }
        Ok(self.profiles_by_username.get(username).cloned())
    }

    async fn recent_messages_from(
        &self,
        user_id: &str,
        _limit: u32,
    ) -> Result<Vec<ChannelMessage>, IntroError> {
        self.record(format!("recent:{user_id}"));
        maybe_sleep(self.recent_delay).await;
        if self.fail_recent {
            return Err(IntroError::ParseError("malformed response".into()));
        }
        Ok(self.recent.get(user_id).cloned().unwrap_or_default())
    }
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn message(
    user_id: &str,
    username: &str,
    real_name: Option<&str>,
    text: &str,
    posted_at: DateTime<Utc>,
) -> ChannelMessage {
    ChannelMessage {
        user_id: user_id.to_string(),
        username: username.to_string(),
        real_name: real_name.map(str::to_string),
        text: text.to_string(),
        posted_at,
        permalink: Some(format!(
            "https://example.slack.com/archives/C123/p{}",
            posted_at.timestamp()
        )),
        ts: format!("{}.000100", posted_at.timestamp()),
    }
}

pub fn profile_with_title(user_id: &str, username: &str, title: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        username: username.to_string(),
        title: Some(title.to_string()),
        ..UserProfile::default()
    }
}

pub fn fast_timeouts() -> SearchTimeouts {
    SearchTimeouts {
        profile: Duration::from_millis(50),
        fallback: Duration::from_millis(150),
        safe: Duration::from_millis(300),
    }
}

pub fn test_config(output_dir: &Path) -> AppConfig {
    AppConfig {
        output_dir: output_dir.to_path_buf(),
        timeouts: fast_timeouts(),
        ..AppConfig::default()
    }
}
