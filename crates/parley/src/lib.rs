//! # Parley
//!
//! Stateful chat relay between website visitors and any OpenAI-compatible
//! chat completions endpoint.
//!
//! Each turn goes through the same pipeline:
//!
//! 1. **Rate limiting** per session over a sliding window
//! 2. **History** loaded from a [`SessionStore`]
//! 3. **Context bounding** by message and word budgets, keeping the starter pinned
//! 4. **Retrieval** of site content to augment the system prompt
//! 5. **Completion** against the configured endpoint
//! 6. **Persistence** of the updated history, plus an optional transcript
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let relay = RelayBuilder::new()
//!         .completion_client(Arc::new(OpenAICompatClient::new()?))
//!         .build()?;
//!
//!     let settings = Settings::default()
//!         .with_connection(EndpointConfig::new("https://api.openai.com/v1/chat/completions")
//!             .with_api_key(std::env::var("LLM_API_KEY")?)
//!             .with_model("gpt-4o-mini"))
//!         .normalized();
//!
//!     let reply = relay
//!         .send_message(&settings, InboundMessage::new("Hello!"))
//!         .await?;
//!     println!("{} ({})", reply.reply, reply.session_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`parley-llm`**: completion client, payload rules, reply extraction
//! - **`parley-types`**: settings snapshot and shared events
//! - **`parley-persist`**: session history and rate-limit windows (memory or MongoDB)
//! - **`parley-context`**: history bounding and prompt assembly
//! - **`parley-rag`**: content retrieval and prompt augmentation
//! - **`parley-observability`**: per-session JSONL transcripts

mod builder;
mod error;
pub mod prelude;
mod relay;

pub use builder::RelayBuilder;
pub use error::RelayError;
pub use relay::{ChatRelay, ChatReply, InboundMessage};

pub use parley_llm::{
    CompletionClient, EndpointConfig, LlmError, Message, OpenAICompatClient, Role,
    SamplerOverrides,
};

pub use parley_types::{
    BotSettings, ContextLimits, RagSettings, RateLimitSettings, Settings, TruncationEvent,
};

pub use parley_persist::{
    generate_session_id, Clock, InMemoryRateWindowStore, InMemorySessionStore, ManualClock,
    PersistError, RateLimiter, RateWindowStore, Session, SessionOwner, SessionStats,
    SessionStore, SystemClock,
};

#[cfg(feature = "mongodb")]
pub use parley_persist::{MongoRateWindowStore, MongoSessionStore};

pub use parley_context::{BoundedHistory, ContextStrategy, WindowedContextStrategy};

pub use parley_rag::{ContentRetriever, RetrievedChunk, SearchBackend, SearchHit};

#[cfg(feature = "mongodb")]
pub use parley_rag::MongoContentIndex;

pub use parley_observability::{
    FileTarget, JsonLinesSink, MemoryTarget, NoopSink, RotatingTarget, TranscriptRecord,
    TranscriptSink,
};
