use parley_llm::EndpointConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const DEFAULT_BOT_NAME: &str = "Assistant";

const DEFAULT_RATE_LIMIT_REQUESTS: i64 = 20;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 300;
const MIN_RATE_LIMIT_WINDOW_SECS: i64 = 60;
/// Extra lifetime given to a stored rate window beyond the window itself
const RATE_WINDOW_GRACE_SECS: u64 = 60;

const DEFAULT_MAX_CONTEXT_MESSAGES: i64 = 40;
const DEFAULT_MAX_CONTEXT_WORDS: i64 = 8000;
const MIN_MAX_CONTEXT_WORDS: i64 = 10;

const DEFAULT_RESULTS_COUNT: i64 = 5;
const MAX_RESULTS_COUNT: i64 = 20;
const DEFAULT_MIN_RELEVANCE: f64 = 0.3;

/// Everything one relay turn reads, captured as a single snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: EndpointConfig,

    #[serde(default)]
    pub bot: BotSettings,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub context: ContextLimits,

    #[serde(default)]
    pub rag: RagSettings,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(mut self, connection: EndpointConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_bot(mut self, bot: BotSettings) -> Self {
        self.bot = bot;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitSettings) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_context(mut self, context: ContextLimits) -> Self {
        self.context = context;
        self
    }

    pub fn with_rag(mut self, rag: RagSettings) -> Self {
        self.rag = rag;
        self
    }

    /// Replace out-of-range values with defaults and blank strings with `None`
    pub fn normalized(self) -> Self {
        Self {
            connection: self.connection.normalized(),
            bot: self.bot.normalized(),
            rate_limit: self.rate_limit.normalized(),
            context: self.context.normalized(),
            rag: self.rag.normalized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSettings {
    #[serde(default = "default_bot_name")]
    pub name: String,

    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Greeting shown before the first user message; pinned in context
    #[serde(default)]
    pub starter_message: Option<String>,
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            system_prompt: None,
            starter_message: None,
        }
    }
}

impl BotSettings {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_starter_message(mut self, starter: impl Into<String>) -> Self {
        self.starter_message = Some(starter.into());
        self
    }

    /// Configured prompt, or the stock assistant prompt when unset
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn starter_message(&self) -> Option<&str> {
        self.starter_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    fn normalized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = default_bot_name();
        }
        self.system_prompt = self.system_prompt.filter(|p| !p.trim().is_empty());
        self.starter_message = self.starter_message.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Sliding-window limit applied per session
///
/// Stored signed so that nonsense admin input survives deserialization and
/// gets replaced by defaults in [`Settings::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_limit_requests")]
    pub max_requests: i64,

    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: i64,
}

fn default_rate_limit_requests() -> i64 {
    DEFAULT_RATE_LIMIT_REQUESTS
}

fn default_rate_limit_window_secs() -> i64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl RateLimitSettings {
    pub fn new(max_requests: i64, window_secs: i64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }

    pub fn max_requests(&self) -> usize {
        usize::try_from(self.max_requests).unwrap_or(0)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.window_secs).unwrap_or(0))
    }

    /// How long a stored window must outlive its last entry
    pub fn retention(&self) -> Duration {
        self.window() + Duration::from_secs(RATE_WINDOW_GRACE_SECS)
    }

    fn normalized(mut self) -> Self {
        if self.max_requests < 1 {
            self.max_requests = DEFAULT_RATE_LIMIT_REQUESTS;
        }
        if self.window_secs < MIN_RATE_LIMIT_WINDOW_SECS {
            self.window_secs = DEFAULT_RATE_LIMIT_WINDOW_SECS;
        }
        self
    }
}

/// Bounds on the history sent with each completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLimits {
    #[serde(default = "default_max_context_messages")]
    pub max_messages: i64,

    #[serde(default = "default_max_context_words")]
    pub max_words: i64,
}

fn default_max_context_messages() -> i64 {
    DEFAULT_MAX_CONTEXT_MESSAGES
}

fn default_max_context_words() -> i64 {
    DEFAULT_MAX_CONTEXT_WORDS
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_CONTEXT_MESSAGES,
            max_words: DEFAULT_MAX_CONTEXT_WORDS,
        }
    }
}

impl ContextLimits {
    pub fn new(max_messages: i64, max_words: i64) -> Self {
        Self {
            max_messages,
            max_words,
        }
    }

    /// Never below 1, so the newest message always survives
    pub fn max_messages(&self) -> usize {
        usize::try_from(self.max_messages).unwrap_or(0).max(1)
    }

    pub fn max_words(&self) -> usize {
        usize::try_from(self.max_words).unwrap_or(0)
    }

    fn normalized(mut self) -> Self {
        if self.max_messages < 1 {
            self.max_messages = DEFAULT_MAX_CONTEXT_MESSAGES;
        }
        if self.max_words < MIN_MAX_CONTEXT_WORDS {
            self.max_words = DEFAULT_MAX_CONTEXT_WORDS;
        }
        self
    }
}

/// Retrieval over the site's content index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_results_count")]
    pub results_count: i64,

    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,

    #[serde(default = "default_true")]
    pub cite_sources: bool,

    #[serde(default)]
    pub only_indexed_content: bool,
}

fn default_results_count() -> i64 {
    DEFAULT_RESULTS_COUNT
}

fn default_min_relevance() -> f64 {
    DEFAULT_MIN_RELEVANCE
}

fn default_true() -> bool {
    true
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            results_count: DEFAULT_RESULTS_COUNT,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            cite_sources: true,
            only_indexed_content: false,
        }
    }
}

impl RagSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_results_count(mut self, count: i64) -> Self {
        self.results_count = count;
        self
    }

    pub fn with_min_relevance(mut self, min: f64) -> Self {
        self.min_relevance = min;
        self
    }

    pub fn with_citations(mut self, cite: bool) -> Self {
        self.cite_sources = cite;
        self
    }

    pub fn with_only_indexed_content(mut self, only: bool) -> Self {
        self.only_indexed_content = only;
        self
    }

    pub fn results_count(&self) -> usize {
        usize::try_from(self.results_count).unwrap_or(0).max(1)
    }

    fn normalized(mut self) -> Self {
        self.results_count = if self.results_count < 1 {
            DEFAULT_RESULTS_COUNT
        } else {
            self.results_count.min(MAX_RESULTS_COUNT)
        };
        self.min_relevance = if self.min_relevance.is_finite() {
            self.min_relevance.clamp(0.0, 1.0)
        } else {
            DEFAULT_MIN_RELEVANCE
        };
        self
    }
}
