pub mod events;
pub mod settings;

pub use events::{estimate_tokens, TruncationEvent};
pub use settings::{
    BotSettings, ContextLimits, RagSettings, RateLimitSettings, Settings, DEFAULT_SYSTEM_PROMPT,
};
