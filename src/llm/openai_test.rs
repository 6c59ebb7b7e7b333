use super::*;

// ===== chat completions =====

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "[]" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "[]"));
    assert_eq!(resp.model, "gpt-4o");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_length_maps_to_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "[{\"type\":" }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn cc_parse_null_content_is_empty() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "stop" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert!(resp.content.is_empty());
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn cc_messages_lead_with_system() {
    let messages = [Message::user("draw it")];
    let msgs = build_chat_completions_messages("be terse", &messages);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, "system");
    assert_eq!(msgs[0].content, "be terse");
    assert_eq!(msgs[1].role, "user");
}

#[test]
fn cc_messages_skip_blank_system() {
    let messages = [Message::user("draw it")];
    let msgs = build_chat_completions_messages("   ", &messages);
    assert_eq!(msgs.len(), 1);
}

// ===== responses API =====

#[test]
fn resp_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "[]" }]
        }],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "[]"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 15);
}

#[test]
fn resp_parse_skips_reasoning_items() {
    let json = serde_json::json!({
        "model": "o4-mini",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "[]" }] }
        ]
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.text(), "[]");
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output_text": "Fallback text",
        "usage": { "input_tokens": 5, "output_tokens": 3 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Fallback text"));
}

#[test]
fn resp_parse_incomplete_maps_to_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn resp_input_uses_input_text_for_user() {
    let messages = [Message::user("hello")];
    let input = build_responses_input(&messages);
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "type": "message",
            "role": "user",
            "content": [{ "type": "input_text", "text": "hello" }]
        }])
    );
}
