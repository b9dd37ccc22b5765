//! Validation and enrichment applied to every submitted message before it is
//! stored.

pub mod processing;
pub mod profanity;
pub mod validation;

use tracing::info;

use crate::{
    error::AppError,
    storage::{db::SurrealDbClient, types::chat_message::ChatMessage},
    utils::config::ProfanityPolicy,
};

use self::{
    processing::process_content,
    validation::{MessagePayload, MessageValidator},
};

/// Validate → process → persist, for one message at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePipeline {
    validator: MessageValidator,
    policy: ProfanityPolicy,
}

impl MessagePipeline {
    pub const fn new(policy: ProfanityPolicy) -> Self {
        Self {
            validator: MessageValidator::new(policy),
            policy,
        }
    }

    pub const fn policy(&self) -> ProfanityPolicy {
        self.policy
    }

    /// Runs validation and processing without touching storage.
    pub fn prepare(&self, payload: &MessagePayload) -> Result<ChatMessage, AppError> {
        let validated = self.validator.validate(payload)?;
        let processed = process_content(&validated.content, self.policy);
        Ok(ChatMessage::new(validated, processed))
    }

    pub async fn submit(
        &self,
        payload: &MessagePayload,
        db: &SurrealDbClient,
    ) -> Result<ChatMessage, AppError> {
        let message = self.prepare(payload)?;

        info!(
            message_id = %message.message_id,
            session_id = %message.session_id,
            sender = %message.sender,
            word_count = message.word_count,
            is_filtered = message.is_filtered,
            "Processed chat message"
        );

        message.save(db).await
    }
}
