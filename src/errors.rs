use slack_morphism::errors::SlackClientError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntroError {
    #[error("Failed to parse Slack response: {0}")]
    ParseError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to write report: {0}")]
    ReportError(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    GeneralError(String),
}

impl From<SlackClientError> for IntroError {
    fn from(error: SlackClientError) -> Self {
        IntroError::ApiError(error.to_string())
    }
}

impl From<reqwest::Error> for IntroError {
    fn from(error: reqwest::Error) -> Self {
        IntroError::HttpError(error.to_string())
    }
}

impl From<anyhow::Error> for IntroError {
    fn from(error: anyhow::Error) -> Self {
        IntroError::GeneralError(error.to_string())
    }
}

// Filesystem failures only happen while locating or writing reports.
impl From<std::io::Error> for IntroError {
    fn from(error: std::io::Error) -> Self {
        IntroError::ReportError(error.to_string())
    }
}

impl From<serde_json::Error> for IntroError {
    fn from(error: serde_json::Error) -> Self {
        IntroError::ParseError(error.to_string())
    }
}
