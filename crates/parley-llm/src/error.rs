use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM endpoint is not configured: {0}")]
    Config(String),

    #[error("Failed to reach the LLM endpoint: {0}")]
    Transport(String),

    #[error("LLM request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-2xx answer; `message` is the provider's own error text when it sent one
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Parse(String),
}

impl LlmError {
    /// Whether the request never produced an HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(self, LlmError::Transport(_) | LlmError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
