//! Slack API client module
//!
//! Live `IntroDirectory` backed by the Slack Web API, with rate limiting,
//! retry logic and error handling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiUsersListRequest;
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackCursorId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use tokio_retry::strategy::jitter;
use tokio_retry::{RetryIf, strategy::ExponentialBackoff};
use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::{ChannelMessage, ProfileField, UserProfile};
use crate::errors::IntroError;
use crate::slack::directory::{IntroDirectory, SearchQuery};
use crate::slack::rate_limit::RateLimiter;

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface an IntroError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Upper bound on `search.messages` pages fetched per query.
const MAX_SEARCH_PAGES: u32 = 10;

/// Upper bound on `users.list` pages walked when resolving a username.
const MAX_USER_LIST_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    messages: Option<SearchMessages>,
}

#[derive(Debug, Deserialize)]
struct SearchMessages {
    #[serde(default)]
    matches: Vec<SearchMatch>,
    paging: Option<SearchPaging>,
}

#[derive(Debug, Deserialize)]
struct SearchPaging {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    pages: u32,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    user: Option<String>,
    username: Option<String>,
    #[serde(default)]
    text: String,
    ts: String,
    permalink: Option<String>,
}

/// Profile as Slack serializes it. `fields` is an object keyed by field id,
/// but Slack sends `[]` or `null` when a member has none.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProfile {
    real_name: Option<String>,
    real_name_normalized: Option<String>,
    display_name: Option<String>,
    display_name_normalized: Option<String>,
    status_text: Option<String>,
    title: Option<String>,
    phone: Option<String>,
    skype: Option<String>,
    email: Option<String>,
    fields: Option<Value>,
}

impl RawProfile {
    fn into_profile(self, user_id: &str, username: &str) -> UserProfile {
        let fields: BTreeMap<String, ProfileField> = match self.fields {
            Some(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(id, raw)| match raw {
                    Value::Object(_) => serde_json::from_value(raw).ok().map(|f| (id, f)),
                    Value::String(value) => Some((
                        id,
                        ProfileField {
                            value,
                            ..ProfileField::default()
                        },
                    )),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        UserProfile {
            user_id: user_id.to_string(),
            username: username.to_string(),
            real_name: self.real_name,
            real_name_normalized: self.real_name_normalized,
            display_name: self.display_name,
            display_name_normalized: self.display_name_normalized,
            status_text: self.status_text,
            title: self.title,
            phone: self.phone,
            skype: self.skype,
            email: self.email,
            fields,
        }
    }
}

/// Convert a Slack `ts` (`"1696156800.123456"`) to UTC.
///
/// ```
/// use intros::slack::client::parse_slack_ts;
///
/// let at = parse_slack_ts("1696156800.500000").unwrap();
/// assert_eq!(at.to_rfc3339(), "2023-10-01T10:40:00.500+00:00");
/// assert!(parse_slack_ts("not-a-ts").is_none());
/// ```
#[must_use]
pub fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    DateTime::from_timestamp(secs, micros * 1_000)
}

/// Slack API client with retry logic and error handling
pub struct SlackClient {
    token: SlackApiToken,
    api_base: String,
    limiter: RateLimiter,
    profile_cache: Mutex<HashMap<String, Option<UserProfile>>>,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String, api_base: &str, limiter: RateLimiter) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            api_base: api_base.trim_end_matches('/').to_string(),
            limiter,
            profile_cache: Mutex::new(HashMap::new()),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if no Slack token is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, IntroError> {
        let token = config.slack_token.clone().ok_or_else(|| {
            IntroError::ConfigError("SLACK_TOKEN is required in live mode".to_string())
        })?;
        Ok(Self::new(
            token,
            &config.slack_api_base,
            RateLimiter::new(config.rate_limit),
        ))
    }

    #[must_use]
    pub fn token(&self) -> &SlackApiToken {
        &self.token
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, IntroError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, IntroError>> + Send,
        T: Send,
    {
        // 100ms doubling up to 5s, before jitter.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(4);

        // Slack-level errors (`not_authed`, `user_not_found`) will not improve on retry.
        RetryIf::spawn(strategy, operation, |e: &IntroError| {
            matches!(e, IntroError::HttpError(_))
        })
        .await
    }

    async fn session_client(&self) -> Result<&'static SlackHyperClient, IntroError> {
        self.limiter.acquire().await;
        SLACK_CLIENT.as_ref().ok_or_else(|| {
            IntroError::GeneralError("Slack HTTP connector not initialized".to_string())
        })
    }

    /// Call a read-only Web API method and return the body once Slack reports `ok`.
    async fn api_get(&self, method: &str, params: &[(&str, String)]) -> Result<Value, IntroError> {
        let url = format!("{}/{method}", self.api_base);

        self.with_retry(|| async {
            self.limiter.acquire().await;

            let resp = HTTP_CLIENT
                .get(&url)
                .bearer_auth(&self.token.token_value.0)
                .query(params)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(IntroError::HttpError(format!("{method} HTTP {status}")));
                }
                return Err(IntroError::ApiError(format!("{method} HTTP {status}")));
            }

            let body: Value = resp
                .json()
                .await
                .map_err(|e| IntroError::ParseError(format!("{method} JSON parse error: {e}")))?;

            if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
                return Err(IntroError::ApiError(format!(
                    "{method} error: {}",
                    body.get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                )));
            }

            Ok(body)
        })
        .await
    }

    /// Verify the token and return the id of the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if Slack rejects the token or cannot be reached.
    pub async fn get_authed_user_id(&self) -> Result<String, IntroError> {
        self.with_retry(|| async {
            let session = self.session_client().await?.open_session(&self.token);
            let test_resp = session.auth_test().await?;
            Ok(test_resp.user_id.0)
        })
        .await
    }

    async fn search_pages(
        &self,
        query: &str,
        per_page: u32,
        max_pages: u32,
        sort_dir: &str,
    ) -> Result<Vec<SearchMatch>, IntroError> {
        let mut matches = Vec::new();
        let mut page = 1;

        loop {
            let body = self
                .api_get(
                    "search.messages",
                    &[
                        ("query", query.to_string()),
                        ("count", per_page.min(100).to_string()),
                        ("page", page.to_string()),
                        ("sort", "timestamp".to_string()),
                        ("sort_dir", sort_dir.to_string()),
                    ],
                )
                .await?;

            let parsed: SearchResponse = serde_json::from_value(body)?;
            let Some(messages) = parsed.messages else {
                break;
            };
            matches.extend(messages.matches);

            let pages = messages.paging.map_or(1, |p| p.pages.max(p.page));
            if page >= pages || page >= max_pages || matches.len() >= per_page as usize * max_pages as usize {
                break;
            }
            page += 1;
        }

        debug!(query, count = matches.len(), "search.messages complete");
        Ok(matches)
    }

    async fn to_channel_messages(&self, matches: Vec<SearchMatch>) -> Vec<ChannelMessage> {
        let mut out = Vec::with_capacity(matches.len());

        for m in matches {
            let Some(posted_at) = parse_slack_ts(&m.ts) else {
                warn!(ts = m.ts.as_str(), "Skipping message with unparseable timestamp");
                continue;
            };
            let user_id = m.user.unwrap_or_default();
            let real_name = if user_id.is_empty() {
                None
            } else {
                self.cached_profile(&user_id)
                    .await
                    .and_then(|p| p.real_name)
                    .filter(|n| !n.trim().is_empty())
            };

            out.push(ChannelMessage {
                username: m.username.unwrap_or_else(|| user_id.clone()),
                user_id,
                real_name,
                text: m.text,
                posted_at,
                permalink: m.permalink,
                ts: m.ts,
            });
        }

        out
    }

    /// Profile lookup memoized per client; failures are logged and cached as `None`.
    async fn cached_profile(&self, user_id: &str) -> Option<UserProfile> {
        if let Some(hit) = self.cache().get(user_id) {
            return hit.clone();
        }

        let profile = match self.fetch_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to fetch user profile");
                None
            }
        };
        self.cache().insert(user_id.to_string(), profile.clone());
        profile
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<UserProfile>>> {
        self.profile_cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, IntroError> {
        let body = match self
            .api_get(
                "users.profile.get",
                &[
                    ("user", user_id.to_string()),
                    ("include_labels", "true".to_string()),
                ],
            )
            .await
        {
            Ok(body) => body,
            Err(IntroError::ApiError(msg)) if msg.contains("user_not_found") => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(raw) = body.get("profile").cloned() else {
            return Ok(None);
        };
        let raw: RawProfile = serde_json::from_value(raw)?;
        Ok(Some(raw.into_profile(user_id, "")))
    }

    async fn lookup_user_id(&self, username: &str) -> Result<Option<String>, IntroError> {
        let wanted = username.trim_start_matches('@').to_ascii_lowercase();
        let mut cursor: Option<SlackCursorId> = None;

        for _ in 0..MAX_USER_LIST_PAGES {
            let mut request = SlackApiUsersListRequest::new().with_limit(200);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let page = self
                .with_retry(|| async {
                    let session = self.session_client().await?.open_session(&self.token);
                    Ok(session.users_list(&request).await?)
                })
                .await?;

            // Read through JSON to stay independent of the typed member model.
            let page = serde_json::to_value(&page)?;
            let found = page
                .get("members")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .find(|m| {
                    m.get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|n| n.eq_ignore_ascii_case(&wanted))
                })
                .and_then(|m| m.get("id").and_then(Value::as_str))
                .map(str::to_string);
            if found.is_some() {
                return Ok(found);
            }

            match page
                .pointer("/response_metadata/next_cursor")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
            {
                Some(next) => cursor = Some(SlackCursorId(next.to_string())),
                None => break,
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl IntroDirectory for SlackClient {
    async fn search_messages(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<ChannelMessage>, IntroError> {
        let q = query.to_query_string();
        info!(query = q.as_str(), "Searching Slack messages");

        let matches = self
            .search_pages(&q, query.limit, MAX_SEARCH_PAGES, "asc")
            .await?;
        Ok(self.to_channel_messages(matches).await)
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, IntroError> {
        let profile = self.fetch_profile(user_id).await?;
        self.cache().insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, IntroError> {
        let Some(user_id) = self.lookup_user_id(username).await? else {
            return Ok(None);
        };

        Ok(self.fetch_profile(&user_id).await?.map(|mut p| {
            p.username = username.to_string();
            p
        }))
    }

    async fn recent_messages_from(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ChannelMessage>, IntroError> {
        let q = format!("from:<@{user_id}>");
        let matches = self.search_pages(&q, limit, 1, "desc").await?;
        Ok(self.to_channel_messages(matches).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_profile_tolerates_empty_field_list() {
        let raw: RawProfile =
            serde_json::from_value(serde_json::json!({"title": "PM", "fields": []})).unwrap();
        let profile = raw.into_profile("U1", "bob");
        assert!(profile.fields.is_empty());
        assert_eq!(profile.title.as_deref(), Some("PM"));
    }

    #[test]
    fn raw_profile_reads_custom_fields() {
        let raw: RawProfile = serde_json::from_value(serde_json::json!({
            "fields": {
                "Xf01": {"value": "https://linkedin.com/in/bob", "alt": "", "label": "LinkedIn"}
            }
        }))
        .unwrap();
        let profile = raw.into_profile("U1", "bob");
        assert_eq!(profile.fields["Xf01"].label.as_deref(), Some("LinkedIn"));
    }

    #[test]
    fn slack_ts_without_fraction() {
        let at = parse_slack_ts("1696156800").unwrap();
        assert_eq!(at.timestamp(), 1_696_156_800);
    }
}
