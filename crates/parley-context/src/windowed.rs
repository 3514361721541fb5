use parley_llm::{Message, Role};
use parley_types::{Settings, TruncationEvent};

use crate::strategy::{count_words, BoundedHistory, ContextStrategy};

/// Keeps the most recent messages within message and word budgets
///
/// The message budget is applied first as a tail slice. Then the oldest
/// messages are evicted one at a time while the word count is over budget,
/// never evicting the last remaining message.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowedContextStrategy;

impl WindowedContextStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Split off the starter if it is the first entry and matches the configured text
    fn split_starter<'a>(
        history: &'a [Message],
        settings: &Settings,
    ) -> (Option<Message>, &'a [Message]) {
        let starter_text = settings.bot.starter_message();
        match (starter_text, history.first()) {
            (Some(text), Some(first)) if first.role == Role::Assistant && first.content == text => {
                (Some(first.clone()), &history[1..])
            }
            _ => (None, history),
        }
    }
}

impl ContextStrategy for WindowedContextStrategy {
    fn truncate(
        &self,
        session_id: &str,
        history: &[Message],
        settings: &Settings,
    ) -> BoundedHistory {
        let (starter, conversation) = Self::split_starter(history, settings);
        let max_messages = settings.context.max_messages();
        let max_words = settings.context.max_words();

        let original_messages = conversation.len();
        let original_words = count_words(conversation);

        let mut window = conversation;
        if window.len() > max_messages {
            window = &window[window.len() - max_messages..];
        }

        let mut words = count_words(window);
        while words > max_words && window.len() > 1 {
            window = &window[1..];
            words = count_words(window);
        }

        let truncation = (window.len() < original_messages).then(|| {
            let event = TruncationEvent::new(original_messages, window.len(), original_words, words);
            tracing::info!(
                session_id = %session_id,
                original_messages,
                retained_messages = window.len(),
                original_words,
                retained_words = words,
                original_tokens = event.original_tokens_estimate,
                retained_tokens = event.retained_tokens_estimate,
                "Context truncated"
            );
            event
        });

        BoundedHistory {
            starter,
            conversation: window.to_vec(),
            truncation,
        }
    }

    fn assemble(&self, system_prompt: &str, bounded: &BoundedHistory) -> Vec<Message> {
        let mut messages = Vec::with_capacity(bounded.conversation.len() + 2);
        messages.push(Message::system(system_prompt));
        if let Some(starter) = &bounded.starter {
            messages.push(starter.clone());
        }
        messages.extend(bounded.conversation.iter().cloned());
        messages
    }
}
