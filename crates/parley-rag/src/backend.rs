use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Raw match from the content index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub post_id: i64,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub relevance: f64,
}

/// Indexed content selected for a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub post_id: i64,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub relevance: f64,
}

impl From<SearchHit> for RetrievedChunk {
    fn from(hit: SearchHit) -> Self {
        Self {
            post_id: hit.post_id,
            post_type: hit.post_type,
            title: hit.title,
            content: hit.content,
            url: hit.url,
            relevance: hit.relevance,
        }
    }
}

/// Full-text search over indexed site content
///
/// `query` is already sanitized. Hits should come back best-first, at most
/// `limit` of them.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}
