use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::models::{IntroRecord, LinkedInSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record for this username already existed; the new detection was folded into it.
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// The record already had a LinkedIn URL, which wins.
    AlreadySet,
    UnknownUser,
}

/// Per-run set of intro records keyed by username.
///
/// Records live in insertion order; the index maps each username to its slot so
/// merges touch the same record the report is rendered from.
#[derive(Debug, Default)]
pub struct IntroAggregator {
    records: Vec<IntroRecord>,
    index: HashMap<String, usize>,
}

impl IntroAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detection. Duplicates keep the first record; a later message-derived
    /// LinkedIn URL only fills a gap.
    pub fn insert(&mut self, record: IntroRecord) -> InsertOutcome {
        if let Some(&slot) = self.index.get(&record.username) {
            let existing = &mut self.records[slot];
            if existing.linkedin_url.is_none() && record.linkedin_url.is_some() {
                existing.linkedin_url = record.linkedin_url;
                existing.linkedin_source = record.linkedin_source;
            }
            if existing.permalink.is_none() {
                existing.permalink = record.permalink;
            }
            debug!(username = existing.username.as_str(), "Merged duplicate intro");
            return InsertOutcome::Merged;
        }

        self.index.insert(record.username.clone(), self.records.len());
        self.records.push(record);
        InsertOutcome::Inserted
    }

    /// `(user_id, username)` for every record still missing a LinkedIn URL.
    #[must_use]
    pub fn pending_fallback(&self) -> Vec<(String, String)> {
        self.records
            .iter()
            .filter(|r| r.linkedin_url.is_none())
            .map(|r| (r.user_id.clone(), r.username.clone()))
            .collect()
    }

    /// Record a URL discovered by the profile fallback search.
    pub fn apply_fallback(&mut self, username: &str, url: String) -> MergeOutcome {
        let Some(&slot) = self.index.get(username) else {
            warn!(username, "Dropping fallback result for unknown user");
            return MergeOutcome::UnknownUser;
        };

        let record = &mut self.records[slot];
        if record.linkedin_url.is_some() {
            return MergeOutcome::AlreadySet;
        }

        record.linkedin_url = Some(url);
        record.linkedin_source = Some(LinkedInSource::Profile);
        MergeOutcome::Applied
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<&IntroRecord> {
        self.index.get(username).map(|&slot| &self.records[slot])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<IntroRecord> {
        self.records
    }
}
