use parley_context::ContextStrategy;
use parley_llm::{CompletionClient, Message, Role};
use parley_observability::{TranscriptRecord, TranscriptSink};
use parley_persist::{generate_session_id, RateLimiter, SessionOwner, SessionStore};
use parley_rag::ContentRetriever;
use parley_types::Settings;
use serde::Serialize;
use std::sync::Arc;

use crate::error::RelayError;

/// A visitor's message as received by the relay
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Omitted on the first turn; a fresh id is issued
    pub session_id: Option<String>,
    pub message: String,
    pub client_ip: Option<String>,
    pub user_id: Option<String>,
}

impl InboundMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
}

/// Runs one chat turn end to end
///
/// Construct with [`RelayBuilder`](crate::RelayBuilder).
pub struct ChatRelay {
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) limiter: RateLimiter,
    pub(crate) retriever: ContentRetriever,
    pub(crate) context: Arc<dyn ContextStrategy>,
    pub(crate) completion: Arc<dyn CompletionClient>,
    pub(crate) transcript: Arc<dyn TranscriptSink>,
}

impl ChatRelay {
    /// Issue a new session id; nothing is stored until the first message
    pub fn create_session(&self) -> String {
        generate_session_id()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Relay one message and return the assistant's reply
    ///
    /// History is only saved once a reply was obtained, so a failed turn
    /// leaves the session as it was.
    pub async fn send_message(
        &self,
        settings: &Settings,
        inbound: InboundMessage,
    ) -> Result<ChatReply, RelayError> {
        let message = inbound.message.trim();
        if message.is_empty() {
            return Err(RelayError::InvalidInput("Message is required".to_string()));
        }

        let supplied = inbound
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        if let Some(session_id) = supplied {
            if !self.limiter.allow(session_id, &settings.rate_limit).await {
                return Err(RelayError::RateLimited);
            }
        }

        let (session_id, mut history) = match supplied {
            Some(id) => (id.to_string(), self.sessions.load(id).await?),
            None => (generate_session_id(), Vec::new()),
        };

        if history.is_empty() {
            if let Some(starter) = settings.bot.starter_message() {
                history.push(Message::assistant(starter));
            }
        }
        history.push(Message::user(message));
        self.log(TranscriptRecord::message(
            &session_id,
            Role::User,
            message,
            inbound.client_ip.clone(),
        ))
        .await;

        let bounded = self.context.truncate(&session_id, &history, settings);
        if let Some(event) = bounded.truncation {
            self.log(TranscriptRecord::truncation(&session_id, event)).await;
        }

        let system_prompt = self
            .retriever
            .enhanced_system_prompt(message, settings.bot.system_prompt(), &settings.rag)
            .await;
        let messages = self.context.assemble(&system_prompt, &bounded);

        tracing::debug!(
            session_id = %session_id,
            messages = messages.len(),
            "Requesting completion"
        );
        let reply = self
            .completion
            .complete(&messages, &settings.connection)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "Completion failed");
                RelayError::from(e)
            })?;

        self.log(TranscriptRecord::message(
            &session_id,
            Role::Assistant,
            reply.as_str(),
            None,
        ))
        .await;

        history.push(Message::assistant(reply.as_str()));
        let owner = SessionOwner {
            user_id: inbound.user_id,
            bot_name: Some(settings.bot.name.clone()),
        };
        self.sessions.save(&session_id, history, Some(&owner)).await?;
        self.limiter.record(&session_id, &settings.rate_limit).await;

        tracing::info!(session_id = %session_id, "Chat turn completed");
        Ok(ChatReply { reply, session_id })
    }

    async fn log(&self, record: TranscriptRecord) {
        if let Err(e) = self.transcript.write(record).await {
            tracing::warn!(error = %e, "Failed to write transcript record");
        }
    }
}
