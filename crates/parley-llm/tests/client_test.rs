use mockito::{Matcher, Server};
use parley_llm::{CompletionClient, EndpointConfig, LlmError, Message, OpenAICompatClient};
use serde_json::json;

fn conversation() -> Vec<Message> {
    vec![Message::system("Be brief."), Message::user("hello")]
}

#[tokio::test]
async fn test_complete_returns_reply_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_header("content-type", Matcher::Regex("application/json".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hello"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hi there!"}}]}"#)
        .create_async()
        .await;

    let config = EndpointConfig::new(format!("{}/v1/chat/completions", server.url()))
        .with_api_key("sk-test")
        .with_model("test-model");
    let client = OpenAICompatClient::new().unwrap();

    let reply = client.complete(&conversation(), &config).await.unwrap();

    assert_eq!(reply, "Hi there!");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_auth_header_without_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"choices":[{"text":"ok"}]}"#)
        .create_async()
        .await;

    let config = EndpointConfig::new(server.url());
    let client = OpenAICompatClient::new().unwrap();

    assert_eq!(client.complete(&conversation(), &config).await.unwrap(), "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_uses_provider_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let config = EndpointConfig::new(server.url()).with_api_key("bad");
    let client = OpenAICompatClient::new().unwrap();

    let err = client.complete(&conversation(), &config).await.unwrap_err();
    match err {
        LlmError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_error_without_envelope() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let client = OpenAICompatClient::new().unwrap();
    let err = client
        .complete(&conversation(), &EndpointConfig::new(server.url()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error (HTTP 503)");
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(302)
        .with_header("location", "http://example.invalid/elsewhere")
        .create_async()
        .await;

    let client = OpenAICompatClient::new().unwrap();
    let err = client
        .complete(&conversation(), &EndpointConfig::new(server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Upstream { status: 302, .. }));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let client = OpenAICompatClient::new().unwrap();
    let err = client
        .complete(&conversation(), &EndpointConfig::new(server.url()))
        .await
        .unwrap_err();

    match err {
        LlmError::Parse(message) => assert_eq!(message, "Invalid JSON response from API"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_reply_is_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":""}}]}"#)
        .create_async()
        .await;

    let client = OpenAICompatClient::new().unwrap();
    let err = client
        .complete(&conversation(), &EndpointConfig::new(server.url()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No response content found in API response");
}

#[tokio::test]
async fn test_missing_url_is_config_error() {
    let client = OpenAICompatClient::new().unwrap();
    let err = client
        .complete(&conversation(), &EndpointConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Config(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = OpenAICompatClient::new().unwrap();
    // Port 9 (discard) on loopback is closed in test environments
    let config = EndpointConfig::new("http://127.0.0.1:9/v1/chat/completions").with_timeout_secs(5);

    let err = client.complete(&conversation(), &config).await.unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_silent_endpoint_times_out() {
    // Accepts connections but never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = OpenAICompatClient::new().unwrap();
    let config = EndpointConfig::new(format!("http://{addr}/v1/chat/completions"))
        .with_timeout_secs(1);

    let err = client.complete(&conversation(), &config).await.unwrap_err();

    assert!(matches!(err, LlmError::Timeout(_)), "unexpected error: {err:?}");
    assert!(err.is_transport());
    server.abort();
}
