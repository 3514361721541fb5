use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley::{
    InMemoryRateWindowStore, InMemorySessionStore, MongoContentIndex, MongoRateWindowStore,
    MongoSessionStore, NoopSink, OpenAICompatClient, RelayBuilder, TranscriptSink,
};
use parley_api::{
    build_router,
    config::{Config, StorageBackend},
    reaper::Reaper,
    state::AppState,
};
use parley_observability::{FileTarget, JsonLinesSink, RotatingTarget};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Parley API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize LLM client
    let completion = Arc::new(OpenAICompatClient::new()?);

    let mut builder = RelayBuilder::new().completion_client(completion);

    // Initialize storage
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; sessions are lost on restart");
            builder = builder
                .session_store(Arc::new(InMemorySessionStore::new()))
                .rate_window_store(Arc::new(InMemoryRateWindowStore::new()));
        }
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
            let db = client.database(&config.storage.database);

            let sessions = MongoSessionStore::new(&db);
            sessions.ensure_indexes().await?;
            let windows = MongoRateWindowStore::new(&db);
            windows.ensure_indexes().await?;

            builder = builder
                .session_store(Arc::new(sessions))
                .rate_window_store(Arc::new(windows));

            if config.rag.enabled {
                let index = MongoContentIndex::new(&db, &config.storage.content_collection);
                if let Err(e) = index.ensure_text_index().await {
                    tracing::warn!(error = %e, "Could not ensure content text index");
                }
                builder = builder.search_backend(Arc::new(index));
            }

            tracing::info!("MongoDB connected");
        }
    }

    // Initialize transcript logging
    let transcript: Arc<dyn TranscriptSink> = if config.transcript.enabled {
        tracing::info!("Writing transcripts to {}", config.transcript.dir.display());
        Arc::new(JsonLinesSink::new(RotatingTarget::new(
            FileTarget::new(config.transcript.dir.clone()),
            config.transcript.max_bytes,
        )))
    } else {
        Arc::new(NoopSink)
    };
    builder = builder.transcript_sink(transcript);

    let relay = builder.build()?;

    // Create application state
    let state = AppState::new(config.clone(), relay);

    if config.reaper.enabled {
        Reaper::new(state.sessions().clone(), &config.reaper)
            .with_transcripts(&config.transcript)
            .spawn(Duration::from_secs(config.reaper.interval_secs.max(1)));
        tracing::info!(
            "Session reaper running every {}s",
            config.reaper.interval_secs.max(1)
        );
    }

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
