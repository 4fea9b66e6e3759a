/// Phrases that mark a channel post as a self-introduction. Matched case-insensitively
/// anywhere in the text.
pub const INTRO_PHRASES: [&str; 13] = [
    "hi everyone",
    "hello everyone",
    "hey everyone",
    "hey all",
    "i'm ",
    "my name is",
    "introduction",
    "nice to meet",
    "pleased to meet",
    "excited",
    "happy to be here",
    "just joined",
    "new here",
];

/// Decide whether a message reads like a new member introducing themselves.
///
/// ```
/// use intros::intro::classifier::is_intro_message;
///
/// assert!(is_intro_message("Hi everyone! I'm Jane."));
/// assert!(!is_intro_message("Reminder: meetup at 6pm"));
/// assert!(!is_intro_message(""));
/// ```
#[must_use]
pub fn is_intro_message(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    // Slack sends typographic apostrophes from mobile clients.
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    INTRO_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}
