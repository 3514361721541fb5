use parley_llm::LlmError;
use parley_persist::PersistError;
use thiserror::Error;

/// Why a chat turn produced no reply
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RelayError {
    /// Text safe to show the visitor
    pub fn user_message(&self) -> String {
        match self {
            RelayError::Config(_) => {
                "The chat service is not configured yet. Please contact the site administrator."
                    .to_string()
            }
            RelayError::RateLimited => {
                "You're sending messages too quickly. Please wait a moment before trying again."
                    .to_string()
            }
            RelayError::Transport(_) | RelayError::Storage(_) => {
                "The assistant is temporarily unavailable. Please try again.".to_string()
            }
            RelayError::Upstream { message, .. } => message.clone(),
            RelayError::Parse(_) => {
                "The assistant sent a response that could not be read. Please try again."
                    .to_string()
            }
            RelayError::InvalidInput(message) => message.clone(),
        }
    }

    /// Stable machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "config",
            RelayError::RateLimited => "rate_limited",
            RelayError::Transport(_) => "transport",
            RelayError::Upstream { .. } => "upstream",
            RelayError::Parse(_) => "parse",
            RelayError::Storage(_) => "storage",
            RelayError::InvalidInput(_) => "invalid_input",
        }
    }
}

impl From<LlmError> for RelayError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Config(message) => RelayError::Config(message),
            LlmError::Transport(message) => RelayError::Transport(message),
            timeout @ LlmError::Timeout(_) => RelayError::Transport(timeout.to_string()),
            LlmError::Upstream { status, message } => RelayError::Upstream { status, message },
            LlmError::Parse(message) => RelayError::Parse(message),
        }
    }
}
