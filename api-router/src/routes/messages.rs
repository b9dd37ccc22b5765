use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use common::{
    pipeline::{processing::Metadata, validation::MessagePayload},
    storage::types::chat_message::{ChatMessage, Sender},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// A stored message as returned to clients.
#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message_id: String,
    pub session_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub metadata: Metadata,
}

impl From<ChatMessage> for MessageData {
    fn from(message: ChatMessage) -> Self {
        let metadata = message.metadata();
        Self {
            message_id: message.message_id,
            session_id: message.session_id,
            content: message.content,
            timestamp: message.timestamp,
            sender: message.sender,
            metadata,
        }
    }
}

/// A list item, with the processing fields inlined next to the message.
#[derive(Debug, Serialize)]
pub struct StoredMessageData {
    pub message_id: String,
    pub session_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub word_count: u64,
    pub character_count: u64,
    pub processed_at: DateTime<Utc>,
    pub is_filtered: bool,
}

impl From<ChatMessage> for StoredMessageData {
    fn from(message: ChatMessage) -> Self {
        Self {
            message_id: message.message_id,
            session_id: message.session_id,
            content: message.content,
            timestamp: message.timestamp,
            sender: message.sender,
            word_count: message.word_count,
            character_count: message.character_count,
            processed_at: message.processed_at,
            is_filtered: message.is_filtered,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub session_id: String,
    pub messages: Vec<StoredMessageData>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub sender: Option<String>,
}

pub async fn create_message(
    State(state): State<ApiState>,
    payload: Result<Json<MessagePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let stored = state.pipeline.submit(&payload, &state.db).await?;

    info!(
        message_id = %stored.message_id,
        session_id = %stored.session_id,
        "Created chat message"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageData::from(stored))),
    ))
}

pub async fn list_messages(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidParameter {
            message: format!("The 'limit' parameter must be between 1 and {MAX_LIMIT}"),
            details: Some(format!("Received value: '{limit}'")),
        });
    }

    let sender = match params.sender.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(Sender::parse(raw).ok_or_else(|| ApiError::InvalidParameter {
            message: "The 'sender' parameter must be 'user' or 'system'".to_string(),
            details: Some(format!("Received value: '{raw}'")),
        })?),
    };

    let messages =
        ChatMessage::find_by_session(&session_id, skip, limit, sender, &state.db).await?;
    let total = ChatMessage::count_by_session(&session_id, sender, &state.db).await?;

    let returned = messages.len() as u64;
    let has_more = skip.saturating_add(returned) < total;

    Ok(Json(ApiResponse::success(MessageList {
        session_id,
        messages: messages.into_iter().map(StoredMessageData::from).collect(),
        pagination: Pagination {
            skip,
            limit,
            total,
            has_more,
        },
    })))
}
