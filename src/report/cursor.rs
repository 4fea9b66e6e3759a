//! Search window resolution from CLI dates or previously written reports.

use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::core::models::SearchWindow;
use crate::errors::IntroError;

/// Lookback used when no report exists yet.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 7;

/// Dates supplied on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowArgs {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output_date: Option<NaiveDate>,
}

/// Newest report date embedded in a filename inside `dir`.
///
/// Filenames must match `template` with the `{date}` segment written in `date_format`,
/// the same way reports are named. A missing directory means no report has been
/// written yet.
///
/// # Errors
///
/// Returns `ReportError` if the directory exists but cannot be read.
pub fn latest_report_date(
    dir: &Path,
    template: &str,
    date_format: &str,
) -> Result<Option<NaiveDate>, IntroError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(IntroError::ReportError(format!(
                "cannot read {}: {e}",
                dir.display()
            )));
        }
    };

    let pattern = filename_pattern(template)?;
    let latest = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| {
            pattern
                .captures(&name)
                .and_then(|caps| caps.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), date_format).ok())
        })
        .max();

    debug!(dir = %dir.display(), ?latest, "Scanned existing reports");
    Ok(latest)
}

fn filename_pattern(template: &str) -> Result<Regex, IntroError> {
    let Some((prefix, suffix)) = template.split_once("{date}") else {
        return Err(IntroError::ConfigError(
            "FILENAME_TEMPLATE must contain {date} placeholder".to_string(),
        ));
    };

    Regex::new(&format!(
        r"^{}(.+){}$",
        regex::escape(prefix),
        regex::escape(suffix)
    ))
    .map_err(|e| IntroError::ConfigError(format!("FILENAME_TEMPLATE: {e}")))
}

/// Compute `[start, end)` and the report date.
///
/// Explicit dates win. Otherwise the window starts the day after the newest report,
/// or `DEFAULT_LOOKBACK_DAYS` ago when there is none, and runs until `now`. An
/// explicit end date is inclusive.
///
/// # Errors
///
/// Returns `ConfigError` if the window would be empty.
pub fn resolve_window(
    args: WindowArgs,
    latest_report: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<SearchWindow, IntroError> {
    let start = match (args.start_date, latest_report) {
        (Some(date), _) => start_of_day(date),
        (None, Some(last)) => {
            let next = last.checked_add_days(Days::new(1)).ok_or_else(|| {
                IntroError::ConfigError(format!("report date {last} out of range"))
            })?;
            info!(last_report = %last, start = %next, "Resuming after latest report");
            start_of_day(next)
        }
        (None, None) => now
            .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
            .unwrap_or(now),
    };

    let end = match args.end_date {
        Some(date) => date
            .checked_add_days(Days::new(1))
            .map(start_of_day)
            .ok_or_else(|| IntroError::ConfigError(format!("end date {date} out of range")))?,
        None => now,
    };

    if start >= end {
        return Err(IntroError::ConfigError(format!(
            "empty search window: start {} is not before end {}",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S")
        )));
    }

    let report_date = args
        .output_date
        .or(args.end_date)
        .unwrap_or_else(|| now.date_naive());

    Ok(SearchWindow {
        start,
        end,
        report_date,
    })
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
