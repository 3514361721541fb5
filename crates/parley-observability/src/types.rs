use chrono::{DateTime, Utc};
use parley_llm::Role;
use parley_types::TruncationEvent;
use serde::{Deserialize, Serialize};

/// One line of a session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptRecord {
    /// A user or assistant message as it passed through the relay
    Message {
        timestamp: DateTime<Utc>,
        session_id: String,
        role: Role,
        content: String,
        /// Client address for user messages
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ip: Option<String>,
    },

    /// History was cut to fit the context limits
    Truncation {
        timestamp: DateTime<Utc>,
        session_id: String,
        #[serde(flatten)]
        event: TruncationEvent,
    },
}

impl TranscriptRecord {
    pub fn message(
        session_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        ip: Option<String>,
    ) -> Self {
        Self::Message {
            timestamp: Utc::now(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            ip,
        }
    }

    pub fn truncation(session_id: impl Into<String>, event: TruncationEvent) -> Self {
        Self::Truncation {
            timestamp: Utc::now(),
            session_id: session_id.into(),
            event,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::Message { session_id, .. } | Self::Truncation { session_id, .. } => session_id,
        }
    }
}
