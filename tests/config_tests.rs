use intros::core::config::{AppConfig, DEFAULT_WELCOME_TEMPLATE, ExecutionMode};
use intros::errors::IntroError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, IntroError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults_without_environment() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.slack_token, None);
    assert_eq!(config.channel(), "intros");
    assert_eq!(config.message_search_limit, 100);
    assert_eq!(config.timeouts.profile, Duration::from_secs(30));
    assert_eq!(config.timeouts.fallback, Duration::from_secs(45));
    assert_eq!(config.timeouts.safe, Duration::from_secs(60));
    assert_eq!(config.output_dir, PathBuf::from("welcome_messages"));
    assert_eq!(config.file_permissions, 0o600);
    assert_eq!(config.filename_template, "daily_intros_{date}.md");
    assert_eq!(config.welcome.template, DEFAULT_WELCOME_TEMPLATE);
    assert_eq!(config.mode, ExecutionMode::Live);
}

#[test]
fn test_environment_overrides() {
    let config = config_from(&[
        ("SLACK_TOKEN", "xoxp-test"),
        ("SLACK_CHANNEL", "#welcome"),
        ("SLACK_SEARCH_LIMIT", "250"),
        ("SLACK_PROFILE_TIMEOUT", "10"),
        ("OUTPUT_DIRECTORY", "/tmp/intros"),
        ("OUTPUT_PERMISSIONS", "0640"),
        ("WELCOME_MESSAGE_TEMPLATE", "Hi {first_name}!\\nWelcome."),
        ("REPORT_TIMEZONE", "Pacific/Honolulu"),
        ("INTROS_MODE", "Request"),
    ])
    .unwrap();

    assert_eq!(config.slack_token.as_deref(), Some("xoxp-test"));
    assert_eq!(config.channel(), "welcome");
    assert_eq!(config.message_search_limit, 250);
    assert_eq!(config.timeouts.profile, Duration::from_secs(10));
    assert_eq!(config.output_dir, PathBuf::from("/tmp/intros"));
    assert_eq!(config.file_permissions, 0o640);
    assert_eq!(config.welcome.template, "Hi {first_name}!\nWelcome.");
    assert_eq!(config.report_timezone, chrono_tz::Pacific::Honolulu);
    assert_eq!(config.mode, ExecutionMode::Request);
}

#[test]
fn test_blank_token_is_treated_as_missing() {
    let config = config_from(&[("SLACK_TOKEN", "   ")]).unwrap();
    assert_eq!(config.slack_token, None);
}

#[test]
fn test_out_of_range_timeout_is_rejected() {
    let err = config_from(&[("SLACK_PROFILE_TIMEOUT", "0")]).unwrap_err();
    assert!(matches!(err, IntroError::ConfigError(_)));
    assert!(err.to_string().contains("SLACK_PROFILE_TIMEOUT"));

    assert!(config_from(&[("SLACK_SEARCH_LIMIT", "5000")]).is_err());
}

#[test]
fn test_non_numeric_value_is_rejected() {
    let err = config_from(&[("SLACK_SAFE_TIMEOUT", "soon")]).unwrap_err();
    assert!(matches!(err, IntroError::ConfigError(_)));
}

#[test]
fn test_template_requires_placeholder() {
    let err = config_from(&[("WELCOME_MESSAGE_TEMPLATE", "Welcome aboard!")]).unwrap_err();
    assert!(err.to_string().contains("{first_name}"));

    assert!(config_from(&[("FILENAME_TEMPLATE", "report.md")]).is_err());
}

#[test]
fn test_unknown_timezone_and_mode_are_rejected() {
    assert!(config_from(&[("REPORT_TIMEZONE", "Mars/Olympus")]).is_err());
    assert!(config_from(&[("INTROS_MODE", "batch")]).is_err());
}

#[test]
fn test_empty_channel_is_rejected() {
    assert!(config_from(&[("SLACK_CHANNEL", "  ")]).is_err());
}

#[test]
fn test_execution_mode_parsing() {
    assert_eq!("live".parse::<ExecutionMode>().unwrap(), ExecutionMode::Live);
    assert_eq!(" REQUEST ".parse::<ExecutionMode>().unwrap(), ExecutionMode::Request);
    assert!("".parse::<ExecutionMode>().is_err());
}

#[test]
fn test_api_base_must_be_http_url() {
    let config = config_from(&[("SLACK_API_BASE", "http://127.0.0.1:9000/api/")]).unwrap();
    assert_eq!(config.slack_api_base, "http://127.0.0.1:9000/api/");

    assert!(config_from(&[("SLACK_API_BASE", "not a url")]).is_err());
    assert!(config_from(&[("SLACK_API_BASE", "ftp://slack.com/api")]).is_err());
}

#[test]
fn test_invalid_date_format_is_rejected() {
    let err = config_from(&[("DATE_FORMAT", "%Q")]).unwrap_err();
    assert!(matches!(err, IntroError::ConfigError(_)));
    assert!(err.to_string().contains("DATE_FORMAT"));

    assert!(config_from(&[("DATE_FORMAT", "%H:%M")]).is_err());
    assert!(config_from(&[("DATE_FORMAT", "%Y/%m/%d")]).is_err());

    let config = config_from(&[("DATE_FORMAT", "%d-%m-%Y")]).unwrap();
    assert_eq!(config.date_format, "%d-%m-%Y");
}

#[test]
fn test_timeout_tiers_must_nest() {
    let err = config_from(&[
        ("SLACK_PROFILE_TIMEOUT", "50"),
        ("SLACK_FALLBACK_TIMEOUT", "40"),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("profile <= fallback <= safe"));

    assert!(config_from(&[("SLACK_FALLBACK_TIMEOUT", "90")]).is_err());
    assert!(
        config_from(&[
            ("SLACK_PROFILE_TIMEOUT", "45"),
            ("SLACK_FALLBACK_TIMEOUT", "45"),
            ("SLACK_SAFE_TIMEOUT", "45"),
        ])
        .is_ok()
    );
}
