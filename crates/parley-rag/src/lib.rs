pub mod backend;
pub mod error;
pub mod prompt;
pub mod query;
pub mod retriever;

#[cfg(feature = "mongodb")]
pub mod mongo;

pub use backend::{RetrievedChunk, SearchBackend, SearchHit};
pub use error::{RagError, Result};
pub use prompt::{build_context, compose_enhanced_prompt, truncate_content};
pub use query::sanitize_query;
pub use retriever::ContentRetriever;

#[cfg(feature = "mongodb")]
pub use mongo::MongoContentIndex;
