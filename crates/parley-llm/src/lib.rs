pub mod config;
pub mod error;
pub mod extract;
pub mod openai;
pub mod payload;
pub mod traits;
pub mod types;

pub use config::{EndpointConfig, SamplerOverrides, TlsPolicy, DEFAULT_TIMEOUT_SECS};
pub use error::{LlmError, Result};
pub use extract::{extract_error_message, extract_reply};
pub use openai::OpenAICompatClient;
pub use payload::{build_payload, coerce_integer, MAX_TOKENS_CEILING};
pub use traits::CompletionClient;
pub use types::{Message, Role};
