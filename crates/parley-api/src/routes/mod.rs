pub mod health;
pub mod messages;
pub mod sessions;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::CorsConfig, docs::ApiDoc, middleware::logging, state::AppState};

/// Full router with middleware and API docs
pub fn build_router(state: AppState) -> Router {
    // Outer safety net; handlers enforce the tighter completion deadline
    let hard_timeout = state.settings.connection.timeout()
        + Duration::from_secs(state.config.server.request_grace_secs * 2);
    let cors = build_cors_layer(&state.config.cors);

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/stats", get(sessions::session_stats))
        .route("/sessions/:session_id", delete(sessions::delete_session))
        // Messages
        .route("/messages", post(messages::send_message))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(hard_timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::new()
    }
}
