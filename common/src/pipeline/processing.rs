use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::config::ProfanityPolicy;

use super::profanity;

/// Values derived from message content at processing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub word_count: u64,
    pub character_count: u64,
    pub processed_at: DateTime<Utc>,
    pub is_filtered: bool,
}

/// Content as it will be stored, plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedContent {
    pub content: String,
    pub metadata: Metadata,
}

pub fn process_content(content: &str, policy: ProfanityPolicy) -> ProcessedContent {
    process_content_at(content, policy, Utc::now())
}

/// Counts are taken from `content` exactly as given. Under
/// [`ProfanityPolicy::Redact`] the returned content has banned terms masked.
pub fn process_content_at(
    content: &str,
    policy: ProfanityPolicy,
    processed_at: DateTime<Utc>,
) -> ProcessedContent {
    let is_filtered = profanity::contains_banned_term(content);

    let stored = match policy {
        ProfanityPolicy::Redact if is_filtered => profanity::redact(content).into_owned(),
        _ => content.to_string(),
    };

    ProcessedContent {
        content: stored,
        metadata: Metadata {
            word_count: word_count(content),
            character_count: character_count(content),
            processed_at,
            is_filtered,
        },
    }
}

pub fn word_count(content: &str) -> u64 {
    content.split_whitespace().count() as u64
}

pub fn character_count(content: &str) -> u64 {
    content.chars().count() as u64
}
