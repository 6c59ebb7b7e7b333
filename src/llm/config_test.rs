use super::*;
use std::collections::HashMap;

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_to_anthropic() {
    let cfg = LlmConfig::from_vars(vars(&[("LLM_API_KEY_ENV", "TEST_KEY"), ("TEST_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::Responses);
    assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(cfg.anthropic_base_url, DEFAULT_ANTHROPIC_BASE_URL);
    assert_eq!(cfg.timeouts, LlmTimeouts::default());
    assert_eq!(cfg.api_key, "secret");
}

#[test]
fn parses_openai_overrides() {
    let cfg = LlmConfig::from_vars(vars(&[
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY_ENV", "OPENAI_API_KEY"),
        ("OPENAI_API_KEY", "sk-test"),
        ("LLM_OPENAI_MODE", "chat_completions"),
        ("LLM_OPENAI_BASE_URL", "https://example.test/v1/"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-4o");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::ChatCompletions);
    assert_eq!(cfg.openai_base_url, "https://example.test/v1");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn explicit_model_wins() {
    let cfg = LlmConfig::from_vars(vars(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_MODEL", "claude-haiku-4-5"),
    ]))
    .unwrap();
    assert_eq!(cfg.model, "claude-haiku-4-5");
}

#[test]
fn anthropic_base_url_override_drops_trailing_slash() {
    let cfg = LlmConfig::from_vars(vars(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_ANTHROPIC_BASE_URL", "http://127.0.0.1:8080/v1/"),
    ]))
    .unwrap();
    assert_eq!(cfg.anthropic_base_url, "http://127.0.0.1:8080/v1");
}

#[test]
fn unparseable_timeout_uses_default() {
    let cfg = LlmConfig::from_vars(vars(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_REQUEST_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}

#[test]
fn unknown_provider_errors() {
    let err = LlmConfig::from_vars(vars(&[
        ("LLM_PROVIDER", "bad"),
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
    ]))
    .unwrap_err()
    .to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn unknown_openai_mode_errors() {
    let err = LlmConfig::from_vars(vars(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_OPENAI_MODE", "bad_mode"),
    ]))
    .unwrap_err()
    .to_string();
    assert!(err.contains("unsupported openai_api mode"));
}

#[test]
fn missing_key_env_errors() {
    let err = LlmConfig::from_vars(vars(&[])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "LLM_API_KEY_ENV"));
}

#[test]
fn missing_key_value_names_target_var() {
    let err = LlmConfig::from_vars(vars(&[("LLM_API_KEY_ENV", "ANTHROPIC_API_KEY")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "ANTHROPIC_API_KEY"));
}
