use crate::config::EndpointConfig;
use crate::error::Result;
use crate::types::Message;
use async_trait::async_trait;

/// Single-shot chat completion against an OpenAI-compatible endpoint
///
/// Implementations receive the fully assembled conversation (system prompt
/// first) and return the assistant's reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[Message], config: &EndpointConfig) -> Result<String>;
}
