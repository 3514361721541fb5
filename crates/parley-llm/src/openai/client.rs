// OpenAI-compatible chat completions client (HTTP direct, no SDK)

use crate::config::{EndpointConfig, TlsPolicy};
use crate::error::{LlmError, Result};
use crate::extract::{extract_error_message, extract_reply};
use crate::payload::build_payload;
use crate::traits::CompletionClient;
use crate::types::Message;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Chat completions over plain HTTP(S)
///
/// Holds one verifying and one non-verifying connection pool so the TLS
/// policy can be chosen per request from the endpoint settings.
/// Redirects are never followed.
pub struct OpenAICompatClient {
    verifying: reqwest::Client,
    lenient: reqwest::Client,
}

impl OpenAICompatClient {
    pub fn new() -> Result<Self> {
        let verifying = Self::http_builder()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        let lenient = Self::http_builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { verifying, lenient })
    }

    fn http_builder() -> reqwest::ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
    }

    fn client_for(&self, policy: TlsPolicy) -> &reqwest::Client {
        match policy {
            TlsPolicy::Verify => &self.verifying,
            TlsPolicy::SkipVerification | TlsPolicy::Plaintext => &self.lenient,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatClient {
    async fn complete(&self, messages: &[Message], config: &EndpointConfig) -> Result<String> {
        let url = config
            .url()
            .ok_or_else(|| LlmError::Config("missing endpoint URL".to_string()))?;
        let policy = TlsPolicy::for_endpoint(url, config.disable_ssl_verify);
        let timeout = config.timeout();
        let payload = build_payload(messages, config);

        let mut request = self
            .client_for(policy)
            .post(url)
            .timeout(timeout)
            .json(&payload);
        if let Some(api_key) = config.api_key() {
            request = request.bearer_auth(api_key);
        }

        tracing::debug!(
            url = %url,
            tls = ?policy,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(e, timeout))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(e, timeout))?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Chat completion endpoint returned an error"
            );
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("API error (HTTP {})", status.as_u16()));
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, body = %body, "Completion response is not valid JSON");
            LlmError::Parse("Invalid JSON response from API".to_string())
        })?;

        extract_reply(&data).ok_or_else(|| {
            tracing::warn!(body = %body, "No reply text in completion response");
            LlmError::Parse("No response content found in API response".to_string())
        })
    }
}

fn classify_transport(err: reqwest::Error, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout)
    } else if err.is_builder() {
        LlmError::Config(format!("invalid endpoint URL: {err}"))
    } else {
        LlmError::Transport(err.to_string())
    }
}
