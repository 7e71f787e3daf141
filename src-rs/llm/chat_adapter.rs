use serde_json::{json, Value};
use tracing::debug;

use super::types::{CompletionRequest, LLMResponse, Message, ProviderAdapter};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

pub const CHAT_COMPLETIONS_PATH: &str = "/api/chat/completions";

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

pub struct ChatCompletionAdapter {
    cfg: ChatConfig,
    api: ApiClient,
}

impl ChatCompletionAdapter {
    pub fn new(api: ApiClient, cfg: ChatConfig) -> Self {
        Self { cfg, api }
    }
}

impl ProviderAdapter for ChatCompletionAdapter {
    fn complete(&self, request: CompletionRequest) -> ClientResult<LLMResponse> {
        let model = request
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.cfg.model.clone());
        if model.is_empty() {
            return Err(ClientError::config("no chat model selected"));
        }
        let temperature = request.temperature.unwrap_or(self.cfg.temperature);
        let max_tokens = request.max_tokens.or(self.cfg.max_tokens);
        let payload = build_payload(&request.messages, &model, temperature, max_tokens);
        debug!(model = %model, messages = request.messages.len(), "chat completion");

        let raw = self.api.post_json(CHAT_COMPLETIONS_PATH, &payload)?;
        let content = parse_response(&raw)
            .ok_or_else(|| ClientError::protocol("chat completion response has no choices[0].message.content"))?;
        Ok(LLMResponse {
            content,
            model: raw
                .get("model")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(Some(model)),
            usage: raw.get("usage").cloned(),
            raw: Some(raw),
        })
    }
}

fn build_payload(messages: &[Message], model: &str, temperature: f64, max_tokens: Option<u32>) -> Value {
    let mut payload = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "stream": false,
    });
    if let Some(max_tokens) = max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}

fn parse_response(raw: &Value) -> Option<String> {
    let first = raw.get("choices")?.as_array()?.first()?;
    let message = first.get("message")?;
    match message.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
