use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::{storage::types::chat_message::Sender, utils::config::ProfanityPolicy};

use super::profanity;

/// Maximum number of characters allowed in trimmed content.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Maximum number of characters in `message_id` and `session_id`.
pub const MAX_ID_CHARS: usize = 100;

#[allow(clippy::expect_used)]
static MESSAGE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("message id pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` must not exceed {} characters", MAX_ID_CHARS)]
    IdTooLong(&'static str),
    #[error("sender must be 'user' or 'system', got '{0}'")]
    InvalidSender(String),
    #[error("message_id may only contain letters, digits, hyphens and underscores")]
    InvalidMessageId,
    #[error("content must not be empty")]
    EmptyContent,
    #[error("content must not exceed {} characters (got {0})", MAX_CONTENT_CHARS)]
    ContentTooLong(usize),
    #[error("content contains inappropriate words")]
    InappropriateContent,
    #[error("invalid timestamp '{0}': use ISO 8601, e.g. 2023-06-15T14:30:00Z or 2023-06-15T14:30:00+00:00")]
    InvalidTimestamp(String),
    #[error("timestamp must not be in the future")]
    FutureTimestamp,
}

/// Raw inbound message as submitted by a client.
///
/// Every field is optional so that absence is reported by the validator
/// rather than by the deserializer.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MessagePayload {
    pub message_id: Option<String>,
    pub session_id: Option<String>,
    pub content: Option<String>,
    pub timestamp: Option<String>,
    pub sender: Option<String>,
}

/// A message that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMessage {
    pub message_id: String,
    pub session_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageValidator {
    policy: ProfanityPolicy,
}

impl MessageValidator {
    pub const fn new(policy: ProfanityPolicy) -> Self {
        Self { policy }
    }

    pub fn validate(&self, payload: &MessagePayload) -> Result<ValidatedMessage, ValidationError> {
        self.validate_at(payload, Utc::now())
    }

    /// Validates `payload`, treating `now` as the current instant.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate_at(
        &self,
        payload: &MessagePayload,
        now: DateTime<Utc>,
    ) -> Result<ValidatedMessage, ValidationError> {
        let message_id = required("message_id", payload.message_id.as_deref())?;
        let session_id = required("session_id", payload.session_id.as_deref())?;
        let content = required("content", payload.content.as_deref())?;
        let timestamp = required("timestamp", payload.timestamp.as_deref())?;
        let sender = required("sender", payload.sender.as_deref())?;

        bounded_id("message_id", message_id)?;
        bounded_id("session_id", session_id)?;

        let sender =
            Sender::parse(sender).ok_or_else(|| ValidationError::InvalidSender(sender.to_string()))?;
        validate_message_id(message_id)?;
        self.validate_content(content)?;
        let timestamp = validate_timestamp(timestamp, now)?;

        Ok(ValidatedMessage {
            message_id: message_id.to_string(),
            session_id: session_id.to_string(),
            content: content.to_string(),
            timestamp,
            sender,
        })
    }

    pub fn validate_content(&self, content: &str) -> Result<(), ValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let length = trimmed.chars().count();
        if length > MAX_CONTENT_CHARS {
            return Err(ValidationError::ContentTooLong(length));
        }

        if self.policy == ProfanityPolicy::Reject && profanity::contains_banned_term(content) {
            return Err(ValidationError::InappropriateContent);
        }

        Ok(())
    }
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(name)),
    }
}

fn bounded_id(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_ID_CHARS {
        return Err(ValidationError::IdTooLong(name));
    }
    Ok(())
}

pub fn validate_message_id(message_id: &str) -> Result<(), ValidationError> {
    if MESSAGE_ID_PATTERN.is_match(message_id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidMessageId)
    }
}

/// Parses and checks a timestamp against `now`, both in UTC.
pub fn validate_timestamp(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    let timestamp = parse_timestamp(raw)?;
    if timestamp > now {
        return Err(ValidationError::FutureTimestamp);
    }
    Ok(timestamp)
}

/// Parses an ISO 8601 timestamp into UTC.
///
/// Accepts a trailing `Z`, a numeric offset with or without a colon, or no
/// offset at all, in which case the value is taken to be UTC. A bare date is
/// read as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(ValidationError::InvalidTimestamp(raw.to_string()))
}
