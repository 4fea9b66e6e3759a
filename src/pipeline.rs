//! End-to-end daily intro run: search, classify, extract, fall back, merge, report.

use chrono::{DateTime, Days, Utc};
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::models::{ChannelMessage, IntroRecord, LinkedInSource, RunSummary, SearchWindow};
use crate::errors::IntroError;
use crate::intro::aggregator::{IntroAggregator, MergeOutcome};
use crate::intro::classifier::is_intro_message;
use crate::intro::names::resolve_first_name;
use crate::intro::profile_search::ProfileSearcher;
use crate::report::markdown::{render_report, report_filename, write_report};
use crate::slack::directory::{IntroDirectory, SearchQuery};
use crate::utils::links::extract_linkedin_url;
use crate::utils::sanitize::sanitize_text;

/// Slack's `after:`/`before:` modifiers exclude the named day, so widen by a day on
/// each side and filter on exact timestamps afterwards.
#[must_use]
pub fn build_search_query(config: &AppConfig, window: &SearchWindow) -> SearchQuery {
    let start = window.start.date_naive();
    let end = window.end.date_naive();
    SearchQuery {
        channel: config.channel().to_string(),
        after: start.checked_sub_days(Days::new(1)),
        before: end.checked_add_days(Days::new(1)),
        limit: config.message_search_limit,
    }
}

/// Turn an accepted message into a record. Extraction runs on the raw text so
/// Slack link markup is still intact.
#[must_use]
pub fn build_record(message: &ChannelMessage, config: &AppConfig) -> IntroRecord {
    let real_name = message
        .real_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let linkedin_url = extract_linkedin_url(&message.text);

    IntroRecord {
        first_name: resolve_first_name(
            real_name.as_deref(),
            &message.username,
            &config.welcome.fallback_name,
        ),
        username: message.username.clone(),
        user_id: message.user_id.clone(),
        real_name,
        message_text: sanitize_text(&message.text, config.max_input_length),
        linkedin_source: linkedin_url.as_ref().map(|_| LinkedInSource::Message),
        linkedin_url,
        timestamp: message.posted_at,
        permalink: message.permalink.clone().filter(|p| !p.is_empty()),
    }
}

/// Search the channel and aggregate every intro posted inside the window.
///
/// Returns the aggregator and the number of messages scanned.
///
/// # Errors
///
/// Returns an error if the message search itself fails.
pub async fn collect_intros(
    directory: &dyn IntroDirectory,
    config: &AppConfig,
    window: &SearchWindow,
) -> Result<(IntroAggregator, usize), IntroError> {
    let query = build_search_query(config, window);
    let mut messages = directory.search_messages(&query).await?;
    messages.retain(|m| window.contains(m.posted_at));
    messages.sort_by_key(|m| m.posted_at);

    info!(count = messages.len(), "Messages inside search window");

    let mut aggregator = IntroAggregator::new();
    for message in &messages {
        if message.username.trim().is_empty() {
            warn!(ts = message.ts.as_str(), "Skipping message without a username");
            continue;
        }
        if is_intro_message(&message.text) {
            aggregator.insert(build_record(message, config));
        }
    }

    info!(intros = aggregator.len(), "Introductions detected");
    Ok((aggregator, messages.len()))
}

/// Run the profile fallback for every record still missing a LinkedIn URL.
///
/// Returns `(attempted, found)`. Never fails: each user's search is time-boxed and
/// contained.
pub async fn fill_missing_linkedin(
    directory: &dyn IntroDirectory,
    config: &AppConfig,
    aggregator: &mut IntroAggregator,
) -> (usize, usize) {
    let pending = aggregator.pending_fallback();
    if pending.is_empty() {
        return (0, 0);
    }

    info!(count = pending.len(), "Searching profiles for missing LinkedIn URLs");
    let searcher = ProfileSearcher::new(directory, config.timeouts);
    let mut found = 0;

    for (user_id, username) in &pending {
        let Some(url) = searcher.safe_search(user_id, username).await else {
            continue;
        };
        if aggregator.apply_fallback(username, url) == MergeOutcome::Applied {
            found += 1;
        }
    }

    (pending.len(), found)
}

/// Execute a full run and write the report.
///
/// # Errors
///
/// Returns an error if the message search fails or the report cannot be written.
pub async fn run_daily_intros(
    directory: &dyn IntroDirectory,
    config: &AppConfig,
    window: &SearchWindow,
    generated_at: DateTime<Utc>,
) -> Result<RunSummary, IntroError> {
    info!(
        channel = config.channel(),
        start = %window.start,
        end = %window.end,
        "Starting daily intro run"
    );

    let (mut aggregator, messages_scanned) = collect_intros(directory, config, window).await?;
    let (fallback_attempted, fallback_found) =
        fill_missing_linkedin(directory, config, &mut aggregator).await;

    let records = aggregator.into_records();
    let content = render_report(
        &records,
        window.report_date,
        &generated_at.with_timezone(&config.report_timezone),
        &config.welcome,
        &config.date_format,
    );
    let filename = report_filename(
        &config.filename_template,
        window.report_date,
        &config.date_format,
    );
    let report_path = write_report(
        &config.output_dir,
        &filename,
        &content,
        config.file_permissions,
    )?;

    info!(
        intros = records.len(),
        fallback_attempted,
        fallback_found,
        path = %report_path.display(),
        "Daily intro run complete"
    );

    Ok(RunSummary {
        report_path,
        messages_scanned,
        intro_count: records.len(),
        fallback_attempted,
        fallback_found,
    })
}
