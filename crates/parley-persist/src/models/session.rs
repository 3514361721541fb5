use chrono::{DateTime, Utc};
use parley_llm::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most recent entries kept per session; older ones are dropped on save
pub const MAX_STORED_MESSAGES: usize = 100;

pub const SESSION_ID_PREFIX: &str = "sess_";

/// Opaque, unguessable session handle (`sess_` + 32 hex chars)
pub fn generate_session_id() -> String {
    format!("{}{}", SESSION_ID_PREFIX, Uuid::new_v4().simple())
}

/// Keep only the newest [`MAX_STORED_MESSAGES`] entries
pub fn cap_history(mut history: Vec<Message>) -> Vec<Message> {
    if history.len() > MAX_STORED_MESSAGES {
        let excess = history.len() - MAX_STORED_MESSAGES;
        history.drain(..excess);
    }
    history
}

/// Stored conversation for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: Option<String>,
    pub bot_name: Option<String>,
    pub history: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn message_count(&self) -> usize {
        self.history.len()
    }
}

/// Who a session belongs to; recorded when the session is first stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOwner {
    pub user_id: Option<String>,
    pub bot_name: Option<String>,
}

impl SessionOwner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_bot_name(mut self, bot_name: impl Into<String>) -> Self {
        self.bot_name = Some(bot_name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub active_last_day: u64,
    pub active_last_week: u64,
    pub total_messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_shape() {
        let id = generate_session_id();
        assert!(id.starts_with(SESSION_ID_PREFIX));
        assert_eq!(id.len(), SESSION_ID_PREFIX.len() + 32);
        assert!(id[SESSION_ID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_session_id());
    }

    #[test]
    fn test_cap_history_keeps_newest() {
        let history: Vec<Message> = (0..130).map(|i| Message::user(format!("m{i}"))).collect();

        let capped = cap_history(history);

        assert_eq!(capped.len(), MAX_STORED_MESSAGES);
        assert_eq!(capped[0].content, "m30");
        assert_eq!(capped[99].content, "m129");
    }

    #[test]
    fn test_cap_history_short_is_untouched() {
        let history = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(cap_history(history.clone()), history);
    }
}
