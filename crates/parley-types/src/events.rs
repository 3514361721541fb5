use serde::{Deserialize, Serialize};

/// Rough token estimate: 1.3 tokens per whitespace-separated word, rounded down
pub fn estimate_tokens(words: usize) -> usize {
    words * 13 / 10
}

/// Emitted when context limits drop history before a completion request
///
/// Counts exclude the system prompt and any pinned starter message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationEvent {
    pub original_messages: usize,
    pub retained_messages: usize,
    pub original_words: usize,
    pub retained_words: usize,
    pub original_tokens_estimate: usize,
    pub retained_tokens_estimate: usize,
}

impl TruncationEvent {
    pub fn new(
        original_messages: usize,
        retained_messages: usize,
        original_words: usize,
        retained_words: usize,
    ) -> Self {
        Self {
            original_messages,
            retained_messages,
            original_words,
            retained_words,
            original_tokens_estimate: estimate_tokens(original_words),
            retained_tokens_estimate: estimate_tokens(retained_words),
        }
    }

    pub fn dropped_messages(&self) -> usize {
        self.original_messages.saturating_sub(self.retained_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_estimate_rounds_down() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(3), 3);
        assert_eq!(estimate_tokens(10), 13);
        assert_eq!(estimate_tokens(8000), 10400);
    }

    #[test]
    fn test_event_carries_estimates() {
        let event = TruncationEvent::new(50, 40, 9000, 7990);
        assert_eq!(event.original_tokens_estimate, 11700);
        assert_eq!(event.retained_tokens_estimate, 10387);
        assert_eq!(event.dropped_messages(), 10);
    }
}
