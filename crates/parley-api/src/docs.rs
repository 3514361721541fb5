use utoipa::OpenApi;

use crate::routes::{health, messages, sessions};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        sessions::create_session,
        sessions::delete_session,
        sessions::session_stats,
        messages::send_message,
    ),
    components(schemas(
        health::HealthResponse,
        sessions::CreateSessionResponse,
        sessions::SessionStatsResponse,
        messages::SendMessageRequest,
        messages::SendMessageResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "sessions", description = "Session lifecycle"),
        (name = "messages", description = "Chat relay"),
    ),
    info(title = "Parley API", description = "Stateful chat relay for OpenAI-compatible endpoints")
)]
pub struct ApiDoc;
