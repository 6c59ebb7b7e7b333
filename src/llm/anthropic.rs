//! Anthropic Messages API client.
//!
//! Posts a single-turn diagram request to `{base_url}/messages` and keeps only
//! the text the model emitted. Extended-thinking and unrecognized blocks never
//! reach the generator, since its output must parse as an element array.

use super::config::LlmTimeouts;
use super::types::{ChatResponse, ContentBlock, LlmError, Message};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    messages_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http(timeouts)?;
        Ok(Self { http, api_key, messages_url: format!("{base_url}/messages") })
    }

    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        let request = self
            .http
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let body = MessagesRequest { model, max_tokens, system, messages };
        let text = super::send_json(request, &body).await?;
        parse_response(&text)
    }
}

#[derive(serde::Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [Message],
}

#[derive(serde::Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: String,
    usage: Usage,
}

#[derive(serde::Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let MessagesResponse { content, model, stop_reason, usage } =
        serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    Ok(ChatResponse {
        content: content
            .into_iter()
            .filter(|block| matches!(block, ContentBlock::Text { .. }))
            .collect(),
        model,
        stop_reason,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
