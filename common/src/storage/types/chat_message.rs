use surrealdb::error::Db;
use tracing::{debug, warn};

use crate::{
    error::AppError,
    pipeline::{
        processing::{Metadata, ProcessedContent},
        validation::ValidatedMessage,
    },
    storage::db::SurrealDbClient,
    stored_object,
};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

impl Sender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }

    /// Parse a sender from its wire value. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The record key is the client supplied `message_id`, which is also covered
// by a unique index.
stored_object!(ChatMessage, "chat_message", {
    message_id: String,
    session_id: String,
    content: String,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    timestamp: DateTime<Utc>,
    sender: Sender,
    word_count: u64,
    character_count: u64,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    processed_at: DateTime<Utc>,
    is_filtered: bool
});

#[derive(Deserialize)]
struct CountResult {
    count: u64,
}

impl ChatMessage {
    pub fn new(message: ValidatedMessage, processed: ProcessedContent) -> Self {
        let ProcessedContent { content, metadata } = processed;
        Self {
            id: message.message_id.clone(),
            message_id: message.message_id,
            session_id: message.session_id,
            content,
            timestamp: message.timestamp,
            sender: message.sender,
            word_count: metadata.word_count,
            character_count: metadata.character_count,
            processed_at: metadata.processed_at,
            is_filtered: metadata.is_filtered,
            created_at: Utc::now(),
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            word_count: self.word_count,
            character_count: self.character_count,
            processed_at: self.processed_at,
            is_filtered: self.is_filtered,
        }
    }

    /// Persist the message in a single create.
    ///
    /// A message whose id is already stored yields [`AppError::Conflict`] and
    /// leaves the existing record untouched.
    pub async fn save(self, db: &SurrealDbClient) -> Result<Self, AppError> {
        let message_id = self.message_id.clone();

        match db.store_item(self).await {
            Ok(Some(stored)) => {
                debug!(message_id = %stored.message_id, session_id = %stored.session_id, "Stored chat message");
                Ok(stored)
            }
            Ok(None) => Err(AppError::InternalError(format!(
                "Storing message '{message_id}' returned no record"
            ))),
            Err(err) if is_duplicate_key(&err) => {
                warn!(message_id = %message_id, "Rejected duplicate message id");
                Err(AppError::Conflict(format!(
                    "Message with id '{message_id}' already exists"
                )))
            }
            Err(err) => Err(AppError::Database(err)),
        }
    }

    pub async fn get(message_id: &str, db: &SurrealDbClient) -> Result<Option<Self>, AppError> {
        Ok(db.get_item(message_id).await?)
    }

    pub async fn exists(message_id: &str, db: &SurrealDbClient) -> Result<bool, AppError> {
        Ok(Self::get(message_id, db).await?.is_some())
    }

    /// Messages of a session, newest first, after skipping `skip` and
    /// returning at most `limit`.
    pub async fn find_by_session(
        session_id: &str,
        skip: u64,
        limit: u64,
        sender: Option<Sender>,
        db: &SurrealDbClient,
    ) -> Result<Vec<Self>, AppError> {
        // SurrealDB integers are signed, and no session holds that many rows.
        let Ok(skip) = i64::try_from(skip) else {
            return Ok(Vec::new());
        };

        let sql = if sender.is_some() {
            "SELECT * FROM type::table($table_name) WHERE session_id = $session_id AND sender = $sender ORDER BY timestamp DESC, message_id ASC LIMIT $limit START $skip"
        } else {
            "SELECT * FROM type::table($table_name) WHERE session_id = $session_id ORDER BY timestamp DESC, message_id ASC LIMIT $limit START $skip"
        };

        let messages: Vec<Self> = db
            .client
            .query(sql)
            .bind(("table_name", Self::table_name()))
            .bind(("session_id", session_id.to_owned()))
            .bind(("sender", sender.map(Sender::as_str)))
            .bind(("limit", limit))
            .bind(("skip", skip))
            .await?
            .take(0)?;

        Ok(messages)
    }

    pub async fn count_by_session(
        session_id: &str,
        sender: Option<Sender>,
        db: &SurrealDbClient,
    ) -> Result<u64, AppError> {
        let sql = if sender.is_some() {
            "SELECT count() as count FROM type::table($table_name) WHERE session_id = $session_id AND sender = $sender GROUP ALL"
        } else {
            "SELECT count() as count FROM type::table($table_name) WHERE session_id = $session_id GROUP ALL"
        };

        let result: Option<CountResult> = db
            .client
            .query(sql)
            .bind(("table_name", Self::table_name()))
            .bind(("session_id", session_id.to_owned()))
            .bind(("sender", sender.map(Sender::as_str)))
            .await?
            .take(0)?;

        Ok(result.map_or(0, |r| r.count))
    }
}

/// True when `err` reports that the record key or the unique index on
/// `message_id` is already taken.
fn is_duplicate_key(err: &surrealdb::Error) -> bool {
    match err {
        surrealdb::Error::Db(Db::RecordExists { .. } | Db::IndexExists { .. }) => true,
        surrealdb::Error::Db(_) => false,
        // Remote engines only hand back the rendered message.
        _ => {
            let message = err.to_string();
            message.contains("already exists") || message.contains("already contains")
        }
    }
}
