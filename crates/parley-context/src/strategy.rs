use parley_llm::Message;
use parley_types::{Settings, TruncationEvent};

/// History after context limits were applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundedHistory {
    /// Configured greeting, pinned ahead of the conversation when present
    pub starter: Option<Message>,
    pub conversation: Vec<Message>,
    /// Set only when something was dropped
    pub truncation: Option<TruncationEvent>,
}

impl BoundedHistory {
    pub fn was_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

/// Strategy for fitting conversation history into a completion request
pub trait ContextStrategy: Send + Sync {
    /// Bound `history` (which already ends with the new user message)
    fn truncate(&self, session_id: &str, history: &[Message], settings: &Settings)
        -> BoundedHistory;

    /// Final message list: system prompt, pinned starter, then conversation
    fn assemble(&self, system_prompt: &str, bounded: &BoundedHistory) -> Vec<Message>;
}

/// Whitespace-separated words across all messages
pub fn count_words(messages: &[Message]) -> usize {
    messages.iter().map(Message::word_count).sum()
}
