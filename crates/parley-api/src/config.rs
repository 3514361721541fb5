use config::{Config as ConfigLoader, ConfigError, Environment, File};
use parley_llm::EndpointConfig;
use parley_observability::DEFAULT_MAX_BYTES;
use parley_types::{BotSettings, ContextLimits, RagSettings, RateLimitSettings, Settings};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub reaper: ReaperConfig,

    // Relay settings
    #[serde(default)]
    pub connection: EndpointConfig,
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub context: ContextLimits,
    #[serde(default)]
    pub rag: RagSettings,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_grace_secs")]
    pub request_grace_secs: u64,
    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,
}

fn default_request_grace_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_content_collection")]
    pub content_collection: String,
}

fn default_database() -> String {
    "parley".to_string()
}

fn default_content_collection() -> String {
    "content_index".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Per-session JSONL transcripts on disk
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_transcript_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// 0 keeps transcripts forever
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

fn default_transcript_dir() -> PathBuf {
    PathBuf::from("logs/transcripts")
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_retention_days() -> u64 {
    30
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_transcript_dir(),
            max_bytes: DEFAULT_MAX_BYTES,
            retention_days: default_retention_days(),
        }
    }
}

/// Background cleanup of idle sessions and old transcripts
#[derive(Debug, Clone, Deserialize)]
pub struct ReaperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reaper_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_session_retention_secs")]
    pub session_retention_secs: u64,
}

fn default_reaper_interval_secs() -> u64 {
    900
}

fn default_session_retention_secs() -> u64 {
    3600
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_reaper_interval_secs(),
            session_retention_secs: default_session_retention_secs(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables: `PARLEY_<SECTION>__<KEY>`, e.g. `PARLEY_RATE_LIMIT__MAX_REQUESTS`
    ///
    /// Secrets come from `LLM_API_KEY` and `MONGODB_URI` only.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.apply_secrets(
            std::env::var("LLM_API_KEY").ok(),
            std::env::var("MONGODB_URI").ok(),
        )?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    fn apply_secrets(
        &mut self,
        api_key: Option<String>,
        mongodb_uri: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.connection.api_key = Some(key);
        }

        if let Some(uri) = mongodb_uri {
            self.mongodb_uri = uri;
        }
        if self.storage.backend == StorageBackend::Mongodb && self.mongodb_uri.trim().is_empty() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalized relay settings snapshot
    pub fn settings(&self) -> Settings {
        Settings {
            connection: self.connection.clone(),
            bot: self.bot.clone(),
            rate_limit: self.rate_limit,
            context: self.context,
            rag: self.rag.clone(),
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [storage]
        backend = "memory"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_grace_secs, 5);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.database, "parley");
        assert!(!config.transcript.enabled);
        assert_eq!(config.transcript.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.reaper.session_retention_secs, 3600);
    }

    #[test]
    fn test_shipped_defaults_load() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::from_file(path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.reaper.interval_secs, 900);
        assert_eq!(config.settings().rate_limit.max_requests, 20);
    }

    #[test]
    fn test_settings_are_normalized() {
        let raw = format!(
            "{MINIMAL}
            [rate_limit]
            max_requests = 0
            window_secs = 10

            [context]
            max_words = 3
            "
        );
        let config: Config = toml::from_str(&raw).unwrap();

        let settings = config.settings();
        assert_eq!(settings.rate_limit.max_requests, 20);
        assert_eq!(settings.rate_limit.window_secs, 300);
        assert_eq!(settings.context.max_words, 8000);
    }

    #[test]
    fn test_mongodb_backend_requires_uri() {
        let raw = MINIMAL.replace(r#"backend = "memory""#, r#"backend = "mongodb""#);
        let mut config: Config = toml::from_str(&raw).unwrap();

        assert!(config.apply_secrets(None, None).is_err());
        assert!(config
            .apply_secrets(None, Some("mongodb://localhost:27017".to_string()))
            .is_ok());
    }

    #[test]
    fn test_api_key_comes_from_secret() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();

        config
            .apply_secrets(Some("sk-live".to_string()), None)
            .unwrap();

        assert_eq!(config.settings().connection.api_key(), Some("sk-live"));
    }
}
