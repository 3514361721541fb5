use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its dependencies
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    // Lightweight probe of the session store
    let storage = match state.sessions().get("_health_check").await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Session store health probe failed");
            "disconnected"
        }
    };
    services.insert("storage".to_string(), storage.to_string());

    let llm = if state.settings.connection.url().is_some() {
        "configured"
    } else {
        "unconfigured"
    };
    services.insert("llm".to_string(), llm.to_string());

    let status = if storage == "connected" { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
