use parley::{ChatRelay, SessionStore, Settings};
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Settings are normalized once at startup and shared as a snapshot, so
/// every turn of a request sees the same values.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<Settings>,
    pub relay: Arc<ChatRelay>,
}

impl AppState {
    pub fn new(config: Config, relay: ChatRelay) -> Self {
        let settings = config.settings();
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            relay: Arc::new(relay),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.relay.sessions()
    }
}
