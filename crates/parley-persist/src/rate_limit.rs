use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_types::RateLimitSettings;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;

const RATE_KEY_PREFIX: &str = "ratelimit_";

/// Expiring key/value storage for per-session request timestamps
///
/// Timestamps are unix seconds. Expired entries read back as empty.
#[async_trait]
pub trait RateWindowStore: Send + Sync {
    async fn timestamps(&self, key: &str, now: DateTime<Utc>) -> Result<Vec<i64>>;

    async fn store(&self, key: &str, timestamps: Vec<i64>, expires_at: DateTime<Utc>)
        -> Result<()>;
}

/// Sliding-window request limiter keyed by session id
///
/// Storage failures never block a request: `allow` admits and `record`
/// drops the entry, both with a warning.
pub struct RateLimiter {
    store: Arc<dyn RateWindowStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateWindowStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RateWindowStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether another request fits in the current window
    ///
    /// An empty session id is always allowed.
    pub async fn allow(&self, session_id: &str, limits: &RateLimitSettings) -> bool {
        if session_id.trim().is_empty() {
            return true;
        }

        let now = self.clock.now();
        match self.store.timestamps(&rate_key(session_id), now).await {
            Ok(timestamps) => {
                let cutoff = window_start(now, limits);
                let in_window = timestamps.iter().filter(|ts| **ts > cutoff).count();
                let allowed = in_window < limits.max_requests();
                if !allowed {
                    tracing::info!(
                        session_id = %session_id,
                        requests = in_window,
                        limit = limits.max_requests(),
                        "Rate limit reached"
                    );
                }
                allowed
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Rate window unavailable, allowing request"
                );
                true
            }
        }
    }

    /// Count a request against the session's window
    pub async fn record(&self, session_id: &str, limits: &RateLimitSettings) {
        if session_id.trim().is_empty() {
            return;
        }

        let key = rate_key(session_id);
        let now = self.clock.now();
        let mut timestamps = match self.store.timestamps(&key, now).await {
            Ok(timestamps) => timestamps,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to read rate window");
                Vec::new()
            }
        };

        let cutoff = window_start(now, limits);
        timestamps.retain(|ts| *ts > cutoff);
        timestamps.push(now.timestamp());

        let retention = chrono::Duration::from_std(limits.retention())
            .unwrap_or_else(|_| chrono::Duration::seconds(0));
        if let Err(e) = self.store.store(&key, timestamps, now + retention).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to record request");
        }
    }
}

fn rate_key(session_id: &str) -> String {
    format!("{RATE_KEY_PREFIX}{session_id}")
}

/// Entries at or before this instant are outside the window
fn window_start(now: DateTime<Utc>, limits: &RateLimitSettings) -> i64 {
    now.timestamp() - i64::try_from(limits.window().as_secs()).unwrap_or(i64::MAX)
}
