use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson};
use parley_llm::Message;
use serde::{Deserialize, Serialize};

use crate::models::Session;

/// Session document; `_id` is the public session id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSession {
    #[serde(rename = "_id")]
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub bot_name: Option<String>,
    /// Kept raw so a malformed history degrades to empty instead of failing the read
    #[serde(default)]
    pub history: Bson,
    pub created_at: bson::DateTime,
    pub last_active: bson::DateTime,
}

impl MongoSession {
    pub fn decode_history(&self) -> Vec<Message> {
        match &self.history {
            Bson::Null => Vec::new(),
            raw => bson::from_bson(raw.clone()).unwrap_or_else(|e| {
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "Stored history is unreadable, treating as empty"
                );
                Vec::new()
            }),
        }
    }
}

impl From<MongoSession> for Session {
    fn from(doc: MongoSession) -> Self {
        let history = doc.decode_history();
        Self {
            session_id: doc.session_id,
            user_id: doc.user_id,
            bot_name: doc.bot_name,
            history,
            created_at: from_bson_datetime(doc.created_at),
            last_active: from_bson_datetime(doc.last_active),
        }
    }
}

/// Request timestamps for one rate-limit key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRateWindow {
    #[serde(rename = "_id")]
    pub key: String,
    #[serde(default)]
    pub timestamps: Vec<i64>,
    /// TTL-indexed
    pub expires_at: bson::DateTime,
}

pub fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub fn from_bson_datetime(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}
