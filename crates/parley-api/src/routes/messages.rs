use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use parley::InboundMessage;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use utoipa::ToSchema;

use crate::{
    client_ip::client_ip,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Omit on the first message; reuse the returned id afterwards
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Caller-supplied and unauthenticated; stored as session metadata only,
    /// never used for access decisions
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    pub success: bool,
    pub reply: String,
    pub session_id: String,
}

/// Send a message and wait for the assistant's reply
#[utoipa::path(
    post,
    path = "/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = SendMessageResponse),
        (status = 400, description = "Empty message"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 502, description = "LLM endpoint returned an error"),
        (status = 503, description = "LLM endpoint or storage unreachable"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let ip = client_ip(
        &headers,
        peer.map(|ConnectInfo(addr)| addr.ip()),
        state.config.server.trust_forwarded_headers,
    );

    let inbound = InboundMessage {
        session_id: req.session_id,
        message: req.message,
        client_ip: Some(ip),
        user_id: req.user_id,
    };

    let deadline = state.settings.connection.timeout()
        + Duration::from_secs(state.config.server.request_grace_secs);
    let reply = tokio::time::timeout(deadline, state.relay.send_message(&state.settings, inbound))
        .await
        .map_err(|_| ApiError::DeadlineExceeded)??;

    Ok(Json(SendMessageResponse {
        success: true,
        reply: reply.reply,
        session_id: reply.session_id,
    }))
}
