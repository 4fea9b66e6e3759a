//! Execution strategies, selected once at startup from configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::core::config::{AppConfig, ExecutionMode};
use crate::core::models::{RunSummary, SearchWindow};
use crate::errors::IntroError;
use crate::pipeline::{build_search_query, run_daily_intros};
use crate::report::markdown::write_report;
use crate::slack::client::SlackClient;
use crate::slack::directory::IntroDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Report(RunSummary),
    RequestWritten { path: PathBuf, instructions: String },
}

#[async_trait]
pub trait RunStrategy: Send + Sync {
    /// # Errors
    ///
    /// Returns an error for failures that should abort the run.
    async fn execute(&self, window: &SearchWindow) -> Result<RunOutcome, IntroError>;
}

/// Build the strategy named by `config.mode`.
///
/// # Errors
///
/// Returns an error if live mode has no token or Slack rejects it.
pub async fn select_strategy(config: &AppConfig) -> Result<Box<dyn RunStrategy>, IntroError> {
    match config.mode {
        ExecutionMode::Live => Ok(Box::new(LiveRun::connect(config.clone()).await?)),
        ExecutionMode::Request => Ok(Box::new(RequestRun::new(config.clone()))),
    }
}

/// Runs the pipeline against a directory and writes the report.
pub struct LiveRun {
    directory: Box<dyn IntroDirectory>,
    config: AppConfig,
}

impl LiveRun {
    /// Connect to Slack and verify the token before any searching happens.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured or `auth.test` fails.
    pub async fn connect(config: AppConfig) -> Result<Self, IntroError> {
        let client = SlackClient::from_config(&config)?;
        let user_id = client.get_authed_user_id().await?;
        info!(user_id = user_id.as_str(), "Authenticated with Slack");
        Ok(Self::with_directory(Box::new(client), config))
    }

    #[must_use]
    pub fn with_directory(directory: Box<dyn IntroDirectory>, config: AppConfig) -> Self {
        Self { directory, config }
    }
}

#[async_trait]
impl RunStrategy for LiveRun {
    async fn execute(&self, window: &SearchWindow) -> Result<RunOutcome, IntroError> {
        let summary =
            run_daily_intros(self.directory.as_ref(), &self.config, window, Utc::now()).await?;
        Ok(RunOutcome::Report(summary))
    }
}

/// A self-contained description of an extraction to run where Slack is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroExtractionRequest {
    pub request_id: String,
    pub channel: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub report_date: String,
    pub search_query: String,
    pub created_at: DateTime<Utc>,
}

impl IntroExtractionRequest {
    #[must_use]
    pub fn new(config: &AppConfig, window: &SearchWindow, created_at: DateTime<Utc>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            channel: config.channel().to_string(),
            start: window.start,
            end: window.end,
            report_date: window.report_date.format("%Y-%m-%d").to_string(),
            search_query: build_search_query(config, window).to_query_string(),
            created_at,
        }
    }

    #[must_use]
    pub fn instructions(&self) -> String {
        format!(
            "Extract Slack introductions for request {id}\n\
             \n\
             Channel: #{channel}\n\
             Window: {start} .. {end}\n\
             Search query: {query}\n\
             \n\
             1. Search messages with the query above\n\
             2. Keep introduction messages posted inside the window\n\
             3. Extract LinkedIn profiles from message text\n\
             4. Search member profiles for anyone still missing one\n\
             5. Write the report for {date} with `daily-intros --mode live {start_date} {end_date} {date}`\n",
            id = self.request_id,
            channel = self.channel,
            start = self.start.to_rfc3339(),
            end = self.end.to_rfc3339(),
            query = self.search_query,
            date = self.report_date,
            start_date = self.start.format("%Y-%m-%d"),
            end_date = (self.end - chrono::Duration::seconds(1)).format("%Y-%m-%d"),
        )
    }
}

/// Writes an `IntroExtractionRequest` instead of contacting Slack.
pub struct RequestRun {
    config: AppConfig,
}

impl RequestRun {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RunStrategy for RequestRun {
    async fn execute(&self, window: &SearchWindow) -> Result<RunOutcome, IntroError> {
        let request = IntroExtractionRequest::new(&self.config, window, Utc::now());
        let json = serde_json::to_string_pretty(&request)?;
        let dir = self.config.output_dir.join("requests");
        let path = write_report(
            &dir,
            &format!("intro_request_{}.json", request.request_id),
            &json,
            self.config.file_permissions,
        )?;

        info!(path = %path.display(), request_id = request.request_id.as_str(), "Extraction request written");
        Ok(RunOutcome::RequestWritten {
            path,
            instructions: request.instructions(),
        })
    }
}
