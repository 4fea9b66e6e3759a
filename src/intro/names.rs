/// Last-resort greeting name when every configured fallback is blank.
const LAST_RESORT_NAME: &str = "there";

/// Pick the name to greet someone by: first token of the real name, else the
/// username, else `default`.
///
/// ```
/// use intros::intro::names::resolve_first_name;
///
/// assert_eq!(resolve_first_name(Some("Jane Doe"), "jdoe", "there"), "Jane");
/// assert_eq!(resolve_first_name(Some("  "), "bob99", "there"), "bob99");
/// assert_eq!(resolve_first_name(None, "", "there"), "there");
/// ```
#[must_use]
pub fn resolve_first_name(real_name: Option<&str>, username: &str, default: &str) -> String {
    if let Some(first) = real_name.and_then(|name| name.split_whitespace().next()) {
        return first.to_string();
    }

    let username = username.trim();
    if !username.is_empty() {
        return username.to_string();
    }

    let default = default.trim();
    if default.is_empty() {
        LAST_RESORT_NAME.to_string()
    } else {
        default.to_string()
    }
}

/// Capitalize the first letter and cap the length for use inside a welcome message.
#[must_use]
pub fn greeting_name(first_name: &str, max_len: usize) -> String {
    let mut chars = first_name.trim().chars().take(max_len);
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => LAST_RESORT_NAME.to_string(),
    }
}
