use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley::RelayError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] parley_persist::PersistError),

    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Relay(e) => e.kind(),
            ApiError::SessionNotFound(_) => "not_found",
            ApiError::Persist(_) => "storage",
            ApiError::DeadlineExceeded => "transport",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Relay(e) => {
                let status = match e {
                    RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    RelayError::Upstream { .. } | RelayError::Parse(_) => StatusCode::BAD_GATEWAY,
                    RelayError::Transport(_) | RelayError::Storage(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!("Relay error: {}", e);
                }
                (status, e.user_message())
            }
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Persist(e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Storage error".to_string())
            }
            ApiError::DeadlineExceeded => {
                tracing::error!("Request deadline exceeded");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "The assistant took too long to respond. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
