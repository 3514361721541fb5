use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::IntoResponse,
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use parley::{
    CompletionClient, EndpointConfig, InMemorySessionStore, LlmError, ManualClock, Message,
    RelayBuilder, RelayError, SessionStore,
};
use parley_api::{
    build_router,
    config::{Config, ReaperConfig},
    error::ApiError,
    reaper::Reaper,
    state::AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BASE_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0
    request_grace_secs = 1

    [cors]
    enabled = false
    origins = []

    [storage]
    backend = "memory"

    [logging]
    level = "warn"
    format = "pretty"

    [connection]
    url = "http://llm.invalid/v1/chat/completions"
    timeout_secs = 1

    [rate_limit]
    max_requests = 1
    window_secs = 300
"#;

enum Behaviour {
    Reply(&'static str),
    Fail(u16),
    Stall,
}

struct FakeClient(Behaviour);

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(
        &self,
        _messages: &[Message],
        _config: &EndpointConfig,
    ) -> parley_llm::Result<String> {
        match self.0 {
            Behaviour::Reply(text) => Ok(text.to_string()),
            Behaviour::Fail(status) => Err(LlmError::Upstream {
                status,
                message: "model overloaded".to_string(),
            }),
            Behaviour::Stall => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok("too late".to_string())
            }
        }
    }
}

fn app_with(behaviour: Behaviour) -> (Router, AppState) {
    let config: Config = toml::from_str(BASE_CONFIG).unwrap();
    let relay = RelayBuilder::new()
        .completion_client(Arc::new(FakeClient(behaviour)))
        .build()
        .unwrap();
    let state = AppState::new(config, relay);
    (build_router(state.clone()), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_send_message_returns_reply_and_session() {
    let (app, state) = app_with(Behaviour::Reply("Hi there"));

    let response = app
        .oneshot(post_json("/messages", json!({ "message": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reply"], "Hi there");

    let session_id = body["session_id"].as_str().unwrap();
    assert!(session_id.starts_with("sess_"));

    let history = state.sessions().load(session_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[1].content, "Hi there");
}

#[tokio::test]
async fn test_blank_message_is_bad_request() {
    let (app, _) = app_with(Behaviour::Reply("unused"));

    let response = app
        .oneshot(post_json("/messages", json!({ "message": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_second_message_in_window_is_rate_limited() {
    let (app, _) = app_with(Behaviour::Reply("ok"));

    let first = app
        .clone()
        .oneshot(post_json("/messages", json!({ "message": "one" })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let session_id = read_json(first).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let second = app
        .oneshot(post_json(
            "/messages",
            json!({ "message": "two", "session_id": session_id }),
        ))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(read_json(second).await["kind"], "rate_limited");
}

#[tokio::test]
async fn test_upstream_failure_maps_to_bad_gateway() {
    let (app, _) = app_with(Behaviour::Fail(500));

    let response = app
        .oneshot(post_json("/messages", json!({ "message": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await["kind"], "upstream");
}

#[tokio::test]
async fn test_stalled_completion_hits_deadline() {
    let (app, _) = app_with(Behaviour::Stall);

    let response = app
        .oneshot(post_json("/messages", json!({ "message": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_create_and_delete_session() {
    let (app, state) = app_with(Behaviour::Reply("ok"));

    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let session_id = read_json(created).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Nothing is stored until a message arrives
    let missing = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    state
        .sessions()
        .save(&session_id, vec![Message::user("hello")], None)
        .await
        .unwrap();

    let deleted = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(state.sessions().get(&session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_stats_counts_messages() {
    let (app, _) = app_with(Behaviour::Reply("ok"));

    app.clone()
        .oneshot(post_json("/messages", json!({ "message": "hello" })))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sessions/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total_sessions"], 1);
    assert_eq!(body["total_messages"], 2);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app_with(Behaviour::Reply("ok"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["llm"], "configured");
}

#[tokio::test]
async fn test_api_error_response() {
    let cases = [
        (ApiError::Relay(RelayError::RateLimited), StatusCode::TOO_MANY_REQUESTS),
        (
            ApiError::Relay(RelayError::InvalidInput("Message is required".to_string())),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::Relay(RelayError::Transport("connection refused".to_string())),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            ApiError::SessionNotFound("sess_missing".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (ApiError::DeadlineExceeded, StatusCode::GATEWAY_TIMEOUT),
    ];

    for (error, expected) in cases {
        assert_eq!(error.into_response().status(), expected);
    }
}

#[tokio::test]
async fn test_reaper_purges_idle_sessions() {
    let clock = Arc::new(ManualClock::new(Utc::now() - ChronoDuration::hours(3)));
    let store = Arc::new(InMemorySessionStore::with_clock(clock.clone()));

    store
        .save("sess_idle", vec![Message::user("old")], None)
        .await
        .unwrap();
    clock.set(Utc::now());
    store
        .save("sess_fresh", vec![Message::user("new")], None)
        .await
        .unwrap();

    let config = ReaperConfig {
        enabled: true,
        interval_secs: 60,
        session_retention_secs: 3600,
    };
    let outcome = Reaper::new(store.clone(), &config).run_once().await;

    assert_eq!(outcome.sessions_purged, 1);
    assert_eq!(outcome.transcripts_removed, 0);
    assert!(store.get("sess_idle").await.unwrap().is_none());
    assert!(store.get("sess_fresh").await.unwrap().is_some());
}
