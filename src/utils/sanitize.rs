use chrono::NaiveDate;

/// Default cap on stored message text.
pub const MAX_INPUT_LENGTH: usize = 10_000;

/// Remove control characters (newlines and tabs survive) and hard-truncate to `max_len` chars.
///
/// ```
/// use intros::utils::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("  hi\u{0000} there\n ", 100), "hi there");
/// assert_eq!(sanitize_text("abcdef", 3), "abc");
/// ```
#[must_use]
pub fn sanitize_text(raw: &str, max_len: usize) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .take(max_len)
        .collect();

    cleaned.trim().to_string()
}

/// Whether `s` is a real calendar date in `YYYY-MM-DD` form.
#[must_use]
pub fn is_valid_date(s: &str) -> bool {
    let s = s.trim();
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
