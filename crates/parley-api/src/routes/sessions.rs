use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionStatsResponse {
    pub total_sessions: u64,
    pub active_last_day: u64,
    pub active_last_week: u64,
    pub total_messages: u64,
}

/// Issue a new session id
///
/// Nothing is stored until the first message is sent with it.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session id issued", body = CreateSessionResponse)
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.relay.create_session();
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// Delete a session and its history
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions().delete(&session_id).await? {
        tracing::info!(session_id = %session_id, "Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(session_id))
    }
}

/// Aggregate session counts
#[utoipa::path(
    get,
    path = "/sessions/stats",
    responses(
        (status = 200, description = "Session statistics", body = SessionStatsResponse)
    ),
    tag = "sessions"
)]
pub async fn session_stats(State(state): State<AppState>) -> ApiResult<Json<SessionStatsResponse>> {
    let stats = state.sessions().stats(chrono::Utc::now()).await?;

    Ok(Json(SessionStatsResponse {
        total_sessions: stats.total_sessions,
        active_last_day: stats.active_last_day,
        active_last_week: stats.active_last_week,
        total_messages: stats.total_messages,
    }))
}
