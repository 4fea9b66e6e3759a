use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A message as returned by the channel search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub user_id: String,
    pub username: String,
    pub real_name: Option<String>,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub permalink: Option<String>,
    /// Raw Slack timestamp (`1696156800.123456`).
    pub ts: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileField {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Subset of a Slack user profile that can carry a LinkedIn link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub real_name: Option<String>,
    pub real_name_normalized: Option<String>,
    pub display_name: Option<String>,
    pub display_name_normalized: Option<String>,
    pub status_text: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub skype: Option<String>,
    pub email: Option<String>,
    pub fields: BTreeMap<String, ProfileField>,
}

impl UserProfile {
    /// Non-empty profile values in scan order: standard fields first, then custom fields.
    #[must_use]
    pub fn searchable_fields(&self) -> Vec<&str> {
        let standard = [
            &self.status_text,
            &self.title,
            &self.phone,
            &self.skype,
            &self.real_name_normalized,
            &self.display_name,
            &self.display_name_normalized,
            &self.real_name,
            &self.email,
        ];

        let mut out: Vec<&str> = standard
            .into_iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.trim().is_empty())
            .collect();

        for field in self.fields.values() {
            if !field.value.trim().is_empty() {
                out.push(field.value.as_str());
            }
            if let Some(alt) = field.alt.as_deref()
                && !alt.trim().is_empty()
            {
                out.push(alt);
            }
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkedInSource {
    Message,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroRecord {
    pub username: String,
    pub user_id: String,
    pub real_name: Option<String>,
    pub first_name: String,
    pub message_text: String,
    pub linkedin_url: Option<String>,
    pub linkedin_source: Option<LinkedInSource>,
    pub timestamp: DateTime<Utc>,
    pub permalink: Option<String>,
}

impl IntroRecord {
    /// Name used for the section heading: real name when known, else `@username`.
    ///
    /// Whitespace runs (newlines included) collapse to single spaces so the name
    /// stays on the heading line.
    #[must_use]
    pub fn display_name(&self) -> String {
        let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        match self.real_name.as_deref().map(collapse) {
            Some(name) if !name.is_empty() => name,
            _ => format!("@{}", collapse(&self.username)),
        }
    }

    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Half-open interval `[start, end)` of message post times plus the date the report is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub report_date: NaiveDate,
}

impl SearchWindow {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub messages_scanned: usize,
    pub intro_count: usize,
    pub fallback_attempted: usize,
    pub fallback_found: usize,
}
