//! Markdown rendering of the daily intro report.

use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt::{Display, Write as _};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::config::WelcomeConfig;
use crate::core::models::{IntroRecord, LinkedInSource};
use crate::errors::IntroError;
use crate::intro::names::greeting_name;

/// Substitute the greeting name into the welcome template.
///
/// ```
/// use intros::core::config::WelcomeConfig;
/// use intros::report::markdown::render_welcome;
///
/// let welcome = WelcomeConfig {
///     template: "Aloha {first_name}!".into(),
///     ..WelcomeConfig::default()
/// };
/// assert_eq!(render_welcome(&welcome, "jane"), "Aloha Jane!");
/// ```
#[must_use]
pub fn render_welcome(welcome: &WelcomeConfig, first_name: &str) -> String {
    let name = greeting_name(first_name, welcome.max_name_length);
    welcome.template.replace("{first_name}", &name)
}

/// Build the complete report in memory.
///
/// Each record gets exactly one `## ` heading; the document header uses `#` only.
#[must_use]
pub fn render_report<Tz>(
    records: &[IntroRecord],
    report_date: NaiveDate,
    generated_at: &DateTime<Tz>,
    welcome: &WelcomeConfig,
    date_format: &str,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut parts: Vec<String> = Vec::with_capacity(4 + records.len() * 16);

    parts.push(format!(
        "# Daily Introductions - {}\n\n",
        format_date(report_date, date_format)
    ));
    parts.push(format!(
        "Generated at: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S %Z")
    ));
    parts.push(format!(
        "Found **{}** introduction(s).\n\n",
        records.len()
    ));

    if records.is_empty() {
        parts.push("*No new introductions found.*\n".to_string());
        return parts.concat();
    }

    parts.push("---\n\n".to_string());

    for (i, record) in records.iter().enumerate() {
        push_record(&mut parts, i + 1, record, welcome);
        if i + 1 < records.len() {
            parts.push("---\n\n".to_string());
        }
    }

    parts.concat()
}

fn push_record(parts: &mut Vec<String>, position: usize, record: &IntroRecord, welcome: &WelcomeConfig) {
    parts.push(format!("## {}. {}\n\n", position, record.display_name()));

    parts.push("### User Information\n".to_string());
    parts.push(format!(
        "- **Name:** {}\n",
        single_line(record.real_name.as_deref().unwrap_or(&record.first_name))
    ));
    parts.push(format!("- **Username:** @{}\n", single_line(&record.username)));

    match (&record.linkedin_url, record.linkedin_source) {
        (Some(url), Some(LinkedInSource::Profile)) => {
            parts.push(format!("- **LinkedIn:** [{url}]({}) (from profile)\n", link_target(url)));
        }
        (Some(url), _) => {
            parts.push(format!("- **LinkedIn:** [{url}]({})\n", link_target(url)));
        }
        (None, _) => parts.push("- **LinkedIn:** *Not provided*\n".to_string()),
    }

    if let Some(permalink) = record.permalink.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("- **Message Link:** [View in Slack]({permalink})\n"));
    }
    parts.push(format!("- **Posted:** {}\n\n", record.timestamp_iso()));

    parts.push("### Draft Welcome Message\n\n".to_string());
    parts.push(format!(
        "```\n{}\n```\n\n",
        render_welcome(welcome, &record.first_name)
    ));

    parts.push("### Original Introduction\n\n".to_string());
    parts.push(format!("{}\n\n", quote(&record.message_text)));
}

// Scheme-less links would otherwise resolve relative to the report file.
fn link_target(url: &str) -> String {
    if url.to_ascii_lowercase().starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve the report filename for `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use intros::report::markdown::report_filename;
///
/// let date = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
/// assert_eq!(
///     report_filename("daily_intros_{date}.md", date, "%Y-%m-%d"),
///     "daily_intros_2025-10-02.md"
/// );
/// ```
#[must_use]
pub fn report_filename(template: &str, date: NaiveDate, date_format: &str) -> String {
    template.replace("{date}", &format_date(date, date_format))
}

// Unrenderable formats fall back to ISO dates instead of panicking inside `to_string`.
fn format_date(date: NaiveDate, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(date_format)).is_err() {
        out = date.format("%Y-%m-%d").to_string();
    }
    out
}

/// Write the rendered report with a single write, creating `dir` if needed.
///
/// # Errors
///
/// Returns `ReportError` if the directory cannot be created or the file cannot be written.
pub fn write_report(
    dir: &Path,
    filename: &str,
    content: &str,
    permissions: u32,
) -> Result<PathBuf, IntroError> {
    fs::create_dir_all(dir).map_err(|e| {
        IntroError::ReportError(format!("cannot create {}: {e}", dir.display()))
    })?;

    let path = dir.join(filename);
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(permissions);
    }

    let mut file = options
        .open(&path)
        .map_err(|e| IntroError::ReportError(format!("cannot open {}: {e}", path.display())))?;
    file.write_all(content.as_bytes())
        .map_err(|e| IntroError::ReportError(format!("cannot write {}: {e}", path.display())))?;

    // `mode` only applies on creation; tighten reports left over from earlier runs too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(permissions))?;
    }
    #[cfg(not(unix))]
    let _ = permissions;

    info!(path = %path.display(), bytes = content.len(), "Report written");
    Ok(path)
}
