//! Prelude module for convenient imports
//!
//! ```rust
//! use parley::prelude::*;
//! ```

pub use crate::{
    ChatRelay, ChatReply, InboundMessage, RelayBuilder, RelayError,
    CompletionClient, EndpointConfig, Message, OpenAICompatClient, Role, SamplerOverrides,
    BotSettings, ContextLimits, RagSettings, RateLimitSettings, Settings,
    SessionStore, InMemorySessionStore, RateWindowStore, InMemoryRateWindowStore,
    ContextStrategy, WindowedContextStrategy,
    ContentRetriever, SearchBackend,
    TranscriptSink, NoopSink, JsonLinesSink,
};
