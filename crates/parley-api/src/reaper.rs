use chrono::{DateTime, Utc};
use parley::SessionStore;
use parley_observability::FileTarget;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{ReaperConfig, TranscriptConfig};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Periodic cleanup of idle sessions and old transcript files
pub struct Reaper {
    sessions: Arc<dyn SessionStore>,
    session_retention: Duration,
    transcripts: Option<(FileTarget, Duration)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReapOutcome {
    pub sessions_purged: u64,
    pub transcripts_removed: usize,
}

impl Reaper {
    pub fn new(sessions: Arc<dyn SessionStore>, config: &ReaperConfig) -> Self {
        Self {
            sessions,
            session_retention: Duration::from_secs(config.session_retention_secs),
            transcripts: None,
        }
    }

    /// Also prune transcript files once they pass `retention_days`
    pub fn with_transcripts(mut self, config: &TranscriptConfig) -> Self {
        if config.enabled && config.retention_days > 0 {
            self.transcripts = Some((
                FileTarget::new(config.dir.clone()),
                Duration::from_secs(config.retention_days * SECS_PER_DAY),
            ));
        }
        self
    }

    /// Run a single cleanup pass
    ///
    /// Failures are logged and the pass continues with the next task.
    pub async fn run_once(&self) -> ReapOutcome {
        let mut outcome = ReapOutcome::default();

        let threshold = chrono::Duration::from_std(self.session_retention)
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        match self.sessions.purge_inactive_since(threshold).await {
            Ok(purged) => {
                outcome.sessions_purged = purged;
                if purged > 0 {
                    tracing::info!(purged, "Purged inactive sessions");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
        }

        if let Some((target, max_age)) = &self.transcripts {
            match target.remove_older_than(*max_age).await {
                Ok(removed) => {
                    outcome.transcripts_removed = removed;
                    if removed > 0 {
                        tracing::info!(removed, "Removed expired transcript files");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Transcript cleanup failed"),
            }
        }

        outcome
    }

    /// Run forever on a fixed interval
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}
