use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Extra request parameters merged into the completion payload
///
/// Known sampler keys are typed; anything else the endpoint understands
/// (`presence_penalty`, `stop`, vendor extensions) lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Left untyped: admins write numbers, numeric strings and worse here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SamplerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: impl Into<Value>) -> Self {
        self.max_tokens = Some(max_tokens.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.max_tokens.is_none()
            && self.extra.is_empty()
    }

    /// Flatten into payload keys, typed fields winning over same-named extras
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        if let Some(temperature) = self.temperature {
            map.insert("temperature".to_string(), Value::from(temperature));
        }
        if let Some(top_p) = self.top_p {
            map.insert("top_p".to_string(), Value::from(top_p));
        }
        if let Some(max_tokens) = &self.max_tokens {
            map.insert("max_tokens".to_string(), max_tokens.clone());
        }
        map
    }
}

/// How the TLS layer treats a given endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// https with certificate verification
    Verify,
    /// https, certificate checks disabled by the operator
    SkipVerification,
    /// plain http, nothing to verify
    Plaintext,
}

impl TlsPolicy {
    pub fn for_endpoint(url: &str, disable_verify: bool) -> Self {
        let is_https = url
            .trim()
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"));

        match (is_https, disable_verify) {
            (true, false) => TlsPolicy::Verify,
            (true, true) => TlsPolicy::SkipVerification,
            (false, _) => TlsPolicy::Plaintext,
        }
    }
}

/// Connection settings for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Full completions URL, e.g. `https://api.openai.com/v1/chat/completions`
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub sampler_overrides: SamplerOverrides,

    #[serde(default)]
    pub disable_ssl_verify: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            model: None,
            sampler_overrides: SamplerOverrides::default(),
            disable_ssl_verify: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sampler_overrides(mut self, overrides: SamplerOverrides) -> Self {
        self.sampler_overrides = overrides;
        self
    }

    pub fn with_ssl_verification_disabled(mut self, disabled: bool) -> Self {
        self.disable_ssl_verify = disabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Blank strings count as unset
    pub fn normalized(mut self) -> Self {
        self.url = non_blank(self.url);
        self.api_key = non_blank(self.api_key);
        self.model = non_blank(self.model);
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tls_policy(&self) -> Option<TlsPolicy> {
        self.url()
            .map(|url| TlsPolicy::for_endpoint(url, self.disable_ssl_verify))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
