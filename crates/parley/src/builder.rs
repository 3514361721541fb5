use anyhow::{anyhow, Result};
use parley_context::{ContextStrategy, WindowedContextStrategy};
use parley_llm::CompletionClient;
use parley_observability::{NoopSink, TranscriptSink};
use parley_persist::{
    Clock, InMemoryRateWindowStore, InMemorySessionStore, RateLimiter, RateWindowStore,
    SessionStore, SystemClock,
};
use parley_rag::{ContentRetriever, SearchBackend};
use std::sync::Arc;

use crate::relay::ChatRelay;

/// Builder for a [`ChatRelay`]
///
/// Only the completion client is required. Storage defaults to in-memory,
/// retrieval to disabled and transcripts to discarded.
pub struct RelayBuilder {
    completion: Option<Arc<dyn CompletionClient>>,
    sessions: Option<Arc<dyn SessionStore>>,
    rate_windows: Option<Arc<dyn RateWindowStore>>,
    clock: Arc<dyn Clock>,
    search: Option<Arc<dyn SearchBackend>>,
    context: Arc<dyn ContextStrategy>,
    transcript: Arc<dyn TranscriptSink>,
}

impl RelayBuilder {
    pub fn new() -> Self {
        Self {
            completion: None,
            sessions: None,
            rate_windows: None,
            clock: Arc::new(SystemClock),
            search: None,
            context: Arc::new(WindowedContextStrategy::new()),
            transcript: Arc::new(NoopSink),
        }
    }

    /// Set the completion client
    pub fn completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion = Some(client);
        self
    }

    /// Set the session store
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Set where rate-limit windows are kept
    pub fn rate_window_store(mut self, store: Arc<dyn RateWindowStore>) -> Self {
        self.rate_windows = Some(store);
        self
    }

    /// Clock used by the rate limiter
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enable retrieval over a content index
    pub fn search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.search = Some(backend);
        self
    }

    pub fn context_strategy(mut self, strategy: Arc<dyn ContextStrategy>) -> Self {
        self.context = strategy;
        self
    }

    pub fn transcript_sink(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.transcript = sink;
        self
    }

    /// Build the relay
    pub fn build(self) -> Result<ChatRelay> {
        let completion = self
            .completion
            .ok_or_else(|| anyhow!("Completion client is required"))?;
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));
        let rate_windows = self
            .rate_windows
            .unwrap_or_else(|| Arc::new(InMemoryRateWindowStore::new()));
        let retriever = match self.search {
            Some(backend) => ContentRetriever::new(backend),
            None => ContentRetriever::disabled(),
        };

        Ok(ChatRelay {
            sessions,
            limiter: RateLimiter::with_clock(rate_windows, self.clock),
            retriever,
            context: self.context,
            completion,
            transcript: self.transcript,
        })
    }
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
