use parley_types::RagSettings;
use std::sync::Arc;

use crate::backend::{RetrievedChunk, SearchBackend};
use crate::error::Result;
use crate::prompt::{build_context, compose_enhanced_prompt};
use crate::query::sanitize_query;

/// Finds site content relevant to a message and folds it into prompts
///
/// Without a backend, or with retrieval disabled, every search is empty.
#[derive(Clone, Default)]
pub struct ContentRetriever {
    backend: Option<Arc<dyn SearchBackend>>,
}

impl ContentRetriever {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Ranked chunks for `query`, best first
    ///
    /// Up to `limit` candidates (defaulting to the configured count) are
    /// fetched and ranked, then those under `min_relevance` are dropped, so
    /// fewer than `limit` may come back.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        settings: &RagSettings,
    ) -> Result<Vec<RetrievedChunk>> {
        if !settings.enabled {
            return Ok(Vec::new());
        }
        let Some(backend) = &self.backend else {
            return Ok(Vec::new());
        };

        let query = sanitize_query(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit.unwrap_or_else(|| settings.results_count()).max(1);
        let hits = backend.search(&query, limit).await?;

        let mut chunks: Vec<RetrievedChunk> = hits.into_iter().map(RetrievedChunk::from).collect();
        chunks.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        chunks.truncate(limit);
        chunks.retain(|c| c.relevance >= settings.min_relevance);

        tracing::debug!(query = %query, results = chunks.len(), "Content search complete");
        Ok(chunks)
    }

    /// System prompt augmented with content matching `user_message`
    ///
    /// Falls back to `base_prompt` when retrieval is off, finds nothing, or fails.
    pub async fn enhanced_system_prompt(
        &self,
        user_message: &str,
        base_prompt: &str,
        settings: &RagSettings,
    ) -> String {
        let chunks = match self.search(user_message, None, settings).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(error = %e, "Content search failed, using base prompt");
                return base_prompt.to_string();
            }
        };
        if chunks.is_empty() {
            return base_prompt.to_string();
        }

        let context = build_context(&chunks, settings.cite_sources);
        compose_enhanced_prompt(
            base_prompt,
            &context,
            settings.cite_sources,
            settings.only_indexed_content,
        )
    }

    /// Context block for callers that inject it as a separate message
    pub async fn context_injection(
        &self,
        user_message: &str,
        settings: &RagSettings,
    ) -> Option<String> {
        match self.search(user_message, None, settings).await {
            Ok(chunks) if !chunks.is_empty() => Some(build_context(&chunks, settings.cite_sources)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Content search failed, skipping injection");
                None
            }
        }
    }
}
