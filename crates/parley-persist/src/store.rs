use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_llm::Message;

use crate::error::Result;
use crate::models::{Session, SessionOwner, SessionStats};

/// Durable per-session conversation history
///
/// `load` never fails for unknown or unreadable sessions: it yields an empty
/// history. Concurrent saves to one session are last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored history, oldest first; empty if the session is unknown
    async fn load(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Replace the history (capped to the newest 100) and bump `last_active`
    ///
    /// `owner` is only recorded when the session is created.
    async fn save(
        &self,
        session_id: &str,
        history: Vec<Message>,
        owner: Option<&SessionOwner>,
    ) -> Result<()>;

    async fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Returns whether a session was removed
    async fn delete(&self, session_id: &str) -> Result<bool>;

    /// Ids of sessions whose last activity is older than `threshold`
    async fn list_stale_before(&self, threshold: DateTime<Utc>) -> Result<Vec<String>>;

    /// Remove every session inactive since `threshold`; returns how many
    async fn purge_inactive_since(&self, threshold: DateTime<Utc>) -> Result<u64>;

    /// Most recently active sessions for a user
    async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Session>>;

    async fn stats(&self, now: DateTime<Utc>) -> Result<SessionStats>;
}
