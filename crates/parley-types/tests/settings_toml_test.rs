use parley_types::{Settings, DEFAULT_SYSTEM_PROMPT};

#[test]
fn test_settings_from_toml_with_partial_sections() {
    let raw = r#"
        [connection]
        url = "https://api.example.com/v1/chat/completions"
        model = "gpt-4o-mini"

        [connection.sampler_overrides]
        temperature = 0.4
        max_tokens = "2048"

        [bot]
        name = "Helper"
        starter_message = "Hi! How can I help?"

        [rate_limit]
        max_requests = 5

        [rag]
        enabled = true
        min_relevance = 0.5
    "#;

    let settings: Settings = toml::from_str(raw).unwrap();
    let settings = settings.normalized();

    assert_eq!(settings.connection.model(), Some("gpt-4o-mini"));
    assert_eq!(settings.connection.timeout_secs, 60);
    assert_eq!(settings.connection.sampler_overrides.temperature, Some(0.4));
    assert_eq!(settings.bot.name, "Helper");
    assert_eq!(settings.bot.system_prompt(), DEFAULT_SYSTEM_PROMPT);
    assert_eq!(settings.bot.starter_message(), Some("Hi! How can I help?"));
    assert_eq!(settings.rate_limit.max_requests, 5);
    assert_eq!(settings.rate_limit.window_secs, 300);
    assert_eq!(settings.context.max_messages, 40);
    assert!(settings.rag.enabled);
    assert_eq!(settings.rag.results_count, 5);
    assert_eq!(settings.rag.min_relevance, 0.5);
    assert!(settings.rag.cite_sources);
}

#[test]
fn test_api_key_is_never_serialized() {
    let mut settings = Settings::default();
    settings.connection.api_key = Some("sk-secret".to_string());

    let json = serde_json::to_string(&settings).unwrap();

    assert!(!json.contains("sk-secret"));
}
