use intros::utils::links::{extract_linkedin_from_fields, extract_linkedin_url};

#[test]
fn test_bare_urls() {
    let cases = [
        (
            "Check out my profile: https://linkedin.com/in/johndoe",
            "https://linkedin.com/in/johndoe",
        ),
        (
            "Visit https://www.linkedin.com/in/jane-smith for more info",
            "https://www.linkedin.com/in/jane-smith",
        ),
        (
            "My LinkedIn: https://linkedin.com/in/bob-wilson-123.",
            "https://linkedin.com/in/bob-wilson-123",
        ),
    ];

    for (text, expected) in cases {
        assert_eq!(extract_linkedin_url(text).as_deref(), Some(expected), "text: {text}");
    }
}

#[test]
fn test_angle_bracketed_urls() {
    assert_eq!(
        extract_linkedin_url("<https://linkedin.com/in/johndoe>").as_deref(),
        Some("https://linkedin.com/in/johndoe")
    );
    assert_eq!(
        extract_linkedin_url("profile: <https://www.linkedin.com/in/jane-smith|my profile> thanks")
            .as_deref(),
        Some("https://www.linkedin.com/in/jane-smith")
    );
}

#[test]
fn test_parenthesized_urls() {
    assert_eq!(
        extract_linkedin_url("(https://linkedin.com/in/johndoe)").as_deref(),
        Some("https://linkedin.com/in/johndoe")
    );
    assert_eq!(
        extract_linkedin_url("Say hi (https://www.linkedin.com/in/jane-smith)!").as_deref(),
        Some("https://www.linkedin.com/in/jane-smith")
    );
}

#[test]
fn test_posts_and_pub_paths() {
    assert_eq!(
        extract_linkedin_url("Wrote this: https://www.linkedin.com/posts/jane_activity-123").as_deref(),
        Some("https://www.linkedin.com/posts/jane_activity-123")
    );
    assert_eq!(
        extract_linkedin_url("https://linkedin.com/pub/jane-smith-123").as_deref(),
        Some("https://linkedin.com/pub/jane-smith-123")
    );
}

#[test]
fn test_scheme_less_urls_are_returned_as_written() {
    assert_eq!(
        extract_linkedin_url("Hi everyone! I'm Jane Doe, linkedin.com/in/janedoe here.").as_deref(),
        Some("linkedin.com/in/janedoe")
    );
    assert_eq!(
        extract_linkedin_url("find me at www.linkedin.com/in/JaneDoe").as_deref(),
        Some("www.linkedin.com/in/JaneDoe")
    );
}

#[test]
fn test_scheme_qualified_pub_beats_scheme_less_profile() {
    let text = "old https://www.linkedin.com/pub/jane-doe/1/2/3 new linkedin.com/in/jane";
    assert_eq!(
        extract_linkedin_url(text).as_deref(),
        Some("https://www.linkedin.com/pub/jane-doe/1/2/3")
    );
}

#[test]
fn test_profile_path_beats_posts_path_with_scheme() {
    let text = "My post https://www.linkedin.com/posts/jane_activity-1 and me https://linkedin.com/in/jane";
    assert_eq!(
        extract_linkedin_url(text).as_deref(),
        Some("https://linkedin.com/in/jane")
    );
}

#[test]
fn test_slack_markup_pub_link_is_unwrapped() {
    let text = "<https://linkedin.com/pub/jane-smith-123|my old profile>";
    assert_eq!(
        extract_linkedin_url(text).as_deref(),
        Some("https://linkedin.com/pub/jane-smith-123")
    );
}

#[test]
fn test_bracketed_profile_beats_bare_profile() {
    let text = "https://linkedin.com/in/first then <https://linkedin.com/in/second>";
    assert_eq!(
        extract_linkedin_url(text).as_deref(),
        Some("https://linkedin.com/in/second")
    );
}

#[test]
fn test_no_linkedin_url() {
    for text in [
        "",
        "Hello everyone!",
        "https://github.com/janedoe",
        "notlinkedin.com/in/someone",
        "linkedin.com/company/acme",
    ] {
        assert_eq!(extract_linkedin_url(text), None, "text: {text}");
    }
}

#[test]
fn test_extraction_is_idempotent() {
    let text = "Hey all, (https://linkedin.com/in/repeat) here";
    let first = extract_linkedin_url(text);
    let second = extract_linkedin_url(text);
    assert_eq!(first, second);
    assert_eq!(first.as_deref(), Some("https://linkedin.com/in/repeat"));
}

#[test]
fn test_fields_scan_in_order() {
    let fields = ["PM at Acme", "see linkedin.com/in/bobsmith", "linkedin.com/in/other"];
    assert_eq!(
        extract_linkedin_from_fields(fields).as_deref(),
        Some("linkedin.com/in/bobsmith")
    );
    assert_eq!(extract_linkedin_from_fields(Vec::<String>::new()), None);
}
