mod common;

use common::{at, message};
use intros::core::config::AppConfig;
use intros::core::models::LinkedInSource;
use intros::intro::aggregator::{InsertOutcome, IntroAggregator, MergeOutcome};
use intros::pipeline::build_record;

fn record(username: &str, text: &str, hour: u32) -> intros::core::models::IntroRecord {
    let config = AppConfig::default();
    build_record(
        &message(&format!("U-{username}"), username, None, text, at(2025, 10, 1, hour)),
        &config,
    )
}

#[test]
fn test_duplicate_usernames_merge_into_one_record() {
    let mut aggregator = IntroAggregator::new();

    assert_eq!(
        aggregator.insert(record("alice", "Hi everyone, I'm Alice", 9)),
        InsertOutcome::Inserted
    );
    assert_eq!(
        aggregator.insert(record("alice", "Hi everyone, I'm Alice (edited)", 10)),
        InsertOutcome::Merged
    );

    assert_eq!(aggregator.len(), 1);
    let records = aggregator.into_records();
    assert_eq!(records[0].message_text, "Hi everyone, I'm Alice");
}

#[test]
fn test_later_duplicate_fills_missing_linkedin() {
    let mut aggregator = IntroAggregator::new();
    aggregator.insert(record("alice", "Hi everyone", 9));
    aggregator.insert(record("alice", "Forgot: https://linkedin.com/in/alice", 10));

    let alice = aggregator.get("alice").unwrap();
    assert_eq!(alice.linkedin_url.as_deref(), Some("https://linkedin.com/in/alice"));
    assert_eq!(alice.linkedin_source, Some(LinkedInSource::Message));
    assert!(aggregator.pending_fallback().is_empty());
}

#[test]
fn test_message_url_is_never_overwritten_by_fallback() {
    let mut aggregator = IntroAggregator::new();
    aggregator.insert(record("jdoe", "Hi everyone! linkedin.com/in/janedoe", 9));

    let outcome = aggregator.apply_fallback("jdoe", "https://linkedin.com/in/someone-else".into());

    assert_eq!(outcome, MergeOutcome::AlreadySet);
    let jdoe = aggregator.get("jdoe").unwrap();
    assert_eq!(jdoe.linkedin_url.as_deref(), Some("linkedin.com/in/janedoe"));
    assert_eq!(jdoe.linkedin_source, Some(LinkedInSource::Message));
}

#[test]
fn test_fallback_applies_to_pending_record() {
    let mut aggregator = IntroAggregator::new();
    aggregator.insert(record("bob99", "Excited to join, no links here!", 9));
    aggregator.insert(record("carol", "Hello everyone https://linkedin.com/in/carol", 10));

    assert_eq!(
        aggregator.pending_fallback(),
        vec![("U-bob99".to_string(), "bob99".to_string())]
    );

    let outcome = aggregator.apply_fallback("bob99", "linkedin.com/in/bobsmith".into());
    assert_eq!(outcome, MergeOutcome::Applied);

    let records = aggregator.into_records();
    assert_eq!(records[0].username, "bob99");
    assert_eq!(records[0].linkedin_url.as_deref(), Some("linkedin.com/in/bobsmith"));
    assert_eq!(records[0].linkedin_source, Some(LinkedInSource::Profile));
}

#[test]
fn test_unknown_user_update_is_dropped() {
    let mut aggregator = IntroAggregator::new();
    aggregator.insert(record("alice", "Hi everyone", 9));

    let outcome = aggregator.apply_fallback("mallory", "https://linkedin.com/in/m".into());

    assert_eq!(outcome, MergeOutcome::UnknownUser);
    assert_eq!(aggregator.len(), 1);
    assert!(aggregator.get("mallory").is_none());
}

#[test]
fn test_insertion_order_is_preserved() {
    let mut aggregator = IntroAggregator::new();
    for name in ["zed", "amy", "kai"] {
        aggregator.insert(record(name, "hey all", 9));
    }
    aggregator.insert(record("amy", "hey all again", 11));

    let order: Vec<_> = aggregator
        .into_records()
        .into_iter()
        .map(|r| r.username)
        .collect();
    assert_eq!(order, vec!["zed", "amy", "kai"]);
}
