// In-process storage, used by default and in tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_llm::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::models::{cap_history, Session, SessionOwner, SessionStats};
use crate::rate_limit::RateWindowStore;
use crate::store::SessionStore;

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .map(|s| s.history.clone())
            .unwrap_or_default())
    }

    async fn save(
        &self,
        session_id: &str,
        history: Vec<Message>,
        owner: Option<&SessionOwner>,
    ) -> Result<()> {
        let now = self.clock.now();
        let history = cap_history(history);
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(session_id) {
            Some(session) => {
                session.history = history;
                session.last_active = now;
            }
            None => {
                let owner = owner.cloned().unwrap_or_default();
                sessions.insert(
                    session_id.to_string(),
                    Session {
                        session_id: session_id.to_string(),
                        user_id: owner.user_id,
                        bot_name: owner.bot_name,
                        history,
                        created_at: now,
                        last_active: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn list_stale_before(&self, threshold: DateTime<Utc>) -> Result<Vec<String>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.last_active < threshold)
            .map(|s| s.session_id.clone())
            .collect())
    }

    async fn purge_inactive_since(&self, threshold: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active >= threshold);
        Ok((before - sessions.len()) as u64)
    }

    async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut owned: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<SessionStats> {
        let sessions = self.sessions.read().await;
        let day_ago = now - chrono::Duration::days(1);
        let week_ago = now - chrono::Duration::days(7);

        Ok(SessionStats {
            total_sessions: sessions.len() as u64,
            active_last_day: sessions.values().filter(|s| s.last_active > day_ago).count() as u64,
            active_last_week: sessions.values().filter(|s| s.last_active > week_ago).count() as u64,
            total_messages: sessions.values().map(|s| s.history.len() as u64).sum(),
        })
    }
}

struct RateEntry {
    timestamps: Vec<i64>,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryRateWindowStore {
    entries: Mutex<HashMap<String, RateEntry>>,
}

impl InMemoryRateWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RateWindowStore for InMemoryRateWindowStore {
    async fn timestamps(&self, key: &str, now: DateTime<Utc>) -> Result<Vec<i64>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Sweep every expired window, not just this key's
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(entries
            .get(key)
            .map(|entry| entry.timestamps.clone())
            .unwrap_or_default())
    }

    async fn store(
        &self,
        key: &str,
        timestamps: Vec<i64>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            RateEntry {
                timestamps,
                expires_at,
            },
        );
        Ok(())
    }
}
