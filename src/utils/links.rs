use regex::Regex;
use std::sync::LazyLock;

/// LinkedIn profile URL patterns in priority order; the first pattern with a match wins.
///
/// Slack link markup and parenthesized `/in/` links come first, then raw URLs
/// with a scheme (`/in/`, `/pub/`, `/posts/`), then scheme-less ones in the same
/// path order. Capture group 1 always holds the URL without its delimiters.
static LINKEDIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    const HOST: &str = r"(?:[\w-]+\.)?linkedin\.com";
    const TAIL: &str = r#"[^\s<>()\[\]{}|"']+"#;

    [
        format!(r"(?i)<(https?://{HOST}/in/[^>|\s]+)(?:\|[^>]*)?>"),
        format!(r"(?i)\((https?://{HOST}/in/[^)\s]+)\)"),
        format!(r"(?i)(https?://{HOST}/in/{TAIL})"),
        format!(r"(?i)(https?://{HOST}/pub/{TAIL})"),
        format!(r"(?i)(https?://{HOST}/posts/{TAIL})"),
        format!(r"(?i)\b({HOST}/in/{TAIL})"),
        format!(r"(?i)\b({HOST}/pub/{TAIL})"),
        format!(r"(?i)\b({HOST}/posts/{TAIL})"),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract the highest-priority LinkedIn URL from free text.
///
/// The URL is returned as written, minus surrounding brackets or parentheses and
/// trailing sentence punctuation.
///
/// # Examples
///
/// ```
/// use intros::utils::links::extract_linkedin_url;
///
/// let text = "Hi everyone! I'm Jane Doe, linkedin.com/in/janedoe here.";
/// assert_eq!(
///     extract_linkedin_url(text).as_deref(),
///     Some("linkedin.com/in/janedoe")
/// );
/// assert_eq!(extract_linkedin_url("no links"), None);
/// ```
#[must_use]
pub fn extract_linkedin_url(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    LINKEDIN_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| trim_trailing_punctuation(m.as_str()))
            .filter(|url| has_profile_slug(url))
            .map(str::to_string)
    })
}

/// First LinkedIn URL found across an ordered sequence of strings.
#[must_use]
pub fn extract_linkedin_from_fields<I, S>(fields: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .find_map(|field| extract_linkedin_url(field.as_ref()))
}

// Rejects a bare `linkedin.com/in/` left over after punctuation trimming.
fn has_profile_slug(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["/in/", "/pub/", "/posts/"]
        .iter()
        .find_map(|path| lower.find(path).map(|i| &url[i + path.len()..]))
        .is_some_and(|slug| slug.chars().any(char::is_alphanumeric))
}

#[must_use]
fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(&['.', ',', ';', ':', '!', '?', ')', ']', '}', '>'][..])
}
