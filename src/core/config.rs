use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use std::env;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::IntroError;

pub const DEFAULT_WELCOME_TEMPLATE: &str =
    "Aloha {first_name}!\n\nWelcome to the community!\n\nHave a wonderful day!";

/// How the run talks to Slack. Chosen once at startup, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Query the Slack Web API directly and write the report.
    Live,
    /// Emit an extraction request for execution somewhere with Slack access.
    Request,
}

impl std::str::FromStr for ExecutionMode {
    type Err = IntroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "request" => Ok(Self::Request),
            other => Err(IntroError::ConfigError(format!(
                "unknown mode '{other}' (expected 'live' or 'request')"
            ))),
        }
    }
}

/// Deadlines for the three tiers of the profile fallback search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTimeouts {
    pub profile: Duration,
    pub fallback: Duration,
    pub safe: Duration,
}

impl Default for SearchTimeouts {
    fn default() -> Self {
        Self {
            profile: Duration::from_secs(30),
            fallback: Duration::from_secs(45),
            safe: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WelcomeConfig {
    pub template: String,
    pub fallback_name: String,
    pub max_name_length: usize,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_WELCOME_TEMPLATE.to_string(),
            fallback_name: "there".to_string(),
            max_name_length: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub calls_per_minute: usize,
    pub burst_limit: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            calls_per_minute: 20,
            burst_limit: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_token: Option<String>,
    pub slack_api_base: String,
    pub channel_name: String,
    pub message_search_limit: u32,
    pub timeouts: SearchTimeouts,
    pub rate_limit: RateLimitConfig,
    pub output_dir: PathBuf,
    pub file_permissions: u32,
    pub date_format: String,
    pub filename_template: String,
    pub welcome: WelcomeConfig,
    pub max_input_length: usize,
    pub report_timezone: Tz,
    pub mode: ExecutionMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack_token: None,
            slack_api_base: "https://slack.com/api".to_string(),
            channel_name: "intros".to_string(),
            message_search_limit: 100,
            timeouts: SearchTimeouts::default(),
            rate_limit: RateLimitConfig::default(),
            output_dir: PathBuf::from("welcome_messages"),
            file_permissions: 0o600,
            date_format: "%Y-%m-%d".to_string(),
            filename_template: "daily_intros_{date}.md".to_string(),
            welcome: WelcomeConfig::default(),
            max_input_length: 10_000,
            report_timezone: Tz::UTC,
            mode: ExecutionMode::Live,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or out of range.
    pub fn from_env() -> Result<Self, IntroError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is malformed or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IntroError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            slack_token: lookup("SLACK_TOKEN").filter(|t| !t.trim().is_empty()),
            slack_api_base: lookup("SLACK_API_BASE").unwrap_or(defaults.slack_api_base),
            channel_name: lookup("SLACK_CHANNEL").unwrap_or(defaults.channel_name),
            message_search_limit: parse_var(
                &lookup,
                "SLACK_SEARCH_LIMIT",
                defaults.message_search_limit,
            )?,
            timeouts: SearchTimeouts {
                profile: Duration::from_secs(parse_var(
                    &lookup,
                    "SLACK_PROFILE_TIMEOUT",
                    defaults.timeouts.profile.as_secs(),
                )?),
                fallback: Duration::from_secs(parse_var(
                    &lookup,
                    "SLACK_FALLBACK_TIMEOUT",
                    defaults.timeouts.fallback.as_secs(),
                )?),
                safe: Duration::from_secs(parse_var(
                    &lookup,
                    "SLACK_SAFE_TIMEOUT",
                    defaults.timeouts.safe.as_secs(),
                )?),
            },
            rate_limit: RateLimitConfig {
                calls_per_minute: parse_var(
                    &lookup,
                    "SLACK_CALLS_PER_MINUTE",
                    defaults.rate_limit.calls_per_minute,
                )?,
                burst_limit: parse_var(
                    &lookup,
                    "SLACK_BURST_LIMIT",
                    defaults.rate_limit.burst_limit,
                )?,
            },
            output_dir: lookup("OUTPUT_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            file_permissions: match lookup("OUTPUT_PERMISSIONS") {
                Some(raw) => parse_octal(&raw)?,
                None => defaults.file_permissions,
            },
            date_format: lookup("DATE_FORMAT").unwrap_or(defaults.date_format),
            filename_template: lookup("FILENAME_TEMPLATE").unwrap_or(defaults.filename_template),
            welcome: WelcomeConfig {
                template: lookup("WELCOME_MESSAGE_TEMPLATE")
                    .map(|t| t.replace("\\n", "\n"))
                    .unwrap_or(defaults.welcome.template),
                fallback_name: lookup("FALLBACK_NAME").unwrap_or(defaults.welcome.fallback_name),
                max_name_length: parse_var(
                    &lookup,
                    "MAX_NAME_LENGTH",
                    defaults.welcome.max_name_length,
                )?,
            },
            max_input_length: parse_var(&lookup, "MAX_INPUT_LENGTH", defaults.max_input_length)?,
            report_timezone: match lookup("REPORT_TIMEZONE") {
                Some(raw) => raw.trim().parse::<Tz>().map_err(|e| {
                    IntroError::ConfigError(format!("REPORT_TIMEZONE: {e}"))
                })?,
                None => defaults.report_timezone,
            },
            mode: match lookup("INTROS_MODE") {
                Some(raw) => raw.parse()?,
                None => defaults.mode,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid setting.
    pub fn validate(&self) -> Result<(), IntroError> {
        check_range("SLACK_PROFILE_TIMEOUT", self.timeouts.profile.as_secs(), 1, 300)?;
        check_range("SLACK_FALLBACK_TIMEOUT", self.timeouts.fallback.as_secs(), 1, 600)?;
        check_range("SLACK_SAFE_TIMEOUT", self.timeouts.safe.as_secs(), 1, 600)?;
        if !(self.timeouts.profile <= self.timeouts.fallback
            && self.timeouts.fallback <= self.timeouts.safe)
        {
            return Err(IntroError::ConfigError(format!(
                "timeouts must satisfy profile <= fallback <= safe, got {}s / {}s / {}s",
                self.timeouts.profile.as_secs(),
                self.timeouts.fallback.as_secs(),
                self.timeouts.safe.as_secs()
            )));
        }
        check_range(
            "SLACK_SEARCH_LIMIT",
            u64::from(self.message_search_limit),
            1,
            1000,
        )?;

        match url::Url::parse(&self.slack_api_base) {
            Ok(base) if matches!(base.scheme(), "http" | "https") => {}
            Ok(base) => {
                return Err(IntroError::ConfigError(format!(
                    "SLACK_API_BASE must be http(s), got {}",
                    base.scheme()
                )));
            }
            Err(e) => {
                return Err(IntroError::ConfigError(format!("SLACK_API_BASE: {e}")));
            }
        }

        if self.channel_name.trim().is_empty() {
            return Err(IntroError::ConfigError(
                "SLACK_CHANNEL cannot be empty".to_string(),
            ));
        }
        if self.rate_limit.calls_per_minute == 0 || self.rate_limit.burst_limit == 0 {
            return Err(IntroError::ConfigError(
                "rate limits must be at least 1".to_string(),
            ));
        }
        if self.welcome.template.trim().is_empty() {
            return Err(IntroError::ConfigError(
                "Welcome message template cannot be empty".to_string(),
            ));
        }
        if !self.welcome.template.contains("{first_name}") {
            return Err(IntroError::ConfigError(
                "Welcome message template must contain {first_name} placeholder".to_string(),
            ));
        }
        if self.welcome.max_name_length == 0 || self.max_input_length == 0 {
            return Err(IntroError::ConfigError(
                "MAX_NAME_LENGTH and MAX_INPUT_LENGTH must be positive".to_string(),
            ));
        }
        check_date_format(&self.date_format)?;
        if !self.filename_template.contains("{date}") {
            return Err(IntroError::ConfigError(
                "FILENAME_TEMPLATE must contain {date} placeholder".to_string(),
            ));
        }

        Ok(())
    }

    /// Channel name without a leading `#`.
    #[must_use]
    pub fn channel(&self) -> &str {
        self.channel_name.trim().trim_start_matches('#')
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, IntroError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| IntroError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn parse_octal(raw: &str) -> Result<u32, IntroError> {
    let digits = raw.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8)
        .map_err(|e| IntroError::ConfigError(format!("OUTPUT_PERMISSIONS: {e}")))
}

/// Report dates must render cleanly and parse back to the same day; the newest
/// report's filename is read back to resume the next run.
fn check_date_format(format: &str) -> Result<(), IntroError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(IntroError::ConfigError(format!(
            "DATE_FORMAT '{format}' is not a valid strftime format"
        )));
    }

    let sample = NaiveDate::from_ymd_opt(2025, 10, 2)
        .ok_or_else(|| IntroError::ConfigError("invalid sample date".to_string()))?;
    let mut rendered = String::new();
    if write!(rendered, "{}", sample.format(format)).is_err() {
        return Err(IntroError::ConfigError(format!(
            "DATE_FORMAT '{format}' cannot format a calendar date"
        )));
    }
    if rendered.contains(['/', '\\']) {
        return Err(IntroError::ConfigError(format!(
            "DATE_FORMAT '{format}' must not produce path separators"
        )));
    }
    if NaiveDate::parse_from_str(&rendered, format).ok() != Some(sample) {
        return Err(IntroError::ConfigError(format!(
            "DATE_FORMAT '{format}' must include year, month and day"
        )));
    }

    Ok(())
}

fn check_range(key: &str, value: u64, min: u64, max: u64) -> Result<(), IntroError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(IntroError::ConfigError(format!(
            "{key} must be between {min} and {max}, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_format_accepts_full_dates_only() {
        assert!(check_date_format("%Y-%m-%d").is_ok());
        assert!(check_date_format("%d-%m-%Y").is_ok());
        assert!(check_date_format("%Y%m%d").is_ok());
        assert!(check_date_format("%Q").is_err());
        assert!(check_date_format("%z").is_err());
        assert!(check_date_format("%Y-%m").is_err());
        assert!(check_date_format("%Y/%m/%d").is_err());
    }

    #[test]
    fn octal_permissions_accept_prefix() {
        assert_eq!(parse_octal("0o600").unwrap(), 0o600);
        assert_eq!(parse_octal("640").unwrap(), 0o640);
        assert!(parse_octal("9").is_err());
    }
}
