pub mod openrouter;
pub mod proxy;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use serde_json::Value;

use crate::error::ChatError;
use crate::models::chat::ChatMessage;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Body sent to the proxy endpoint: the whole transcript plus the fixed
/// sampling parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends one request and resolves to the single reply text.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatError>;

    fn endpoint(&self) -> String;
}

/// Pulls `choices[0].message.content` out of a success body.
pub fn extract_reply(body: &[u8]) -> Result<String, ChatError> {
    let value: Value = serde_json
        ::from_slice(body)
        .map_err(|e| ChatError::MalformedResponse(format!("response is not JSON: {}", e)))?;

    let message = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ChatError::MalformedResponse("missing choices[0].message".to_string()))?;

    match message.get("content").and_then(Value::as_str) {
        Some(content) if !content.is_empty() => Ok(content.to_string()),
        _ => Err(ChatError::MalformedResponse("missing choices[0].message.content".to_string())),
    }
}

/// Best-effort read of the `error` field of a failure body. Anything that is
/// not a JSON object with a string `error` yields an empty detail.
pub fn extract_error_detail(body: &[u8]) -> String {
    serde_json
        ::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .and_then(|e| e.as_str().map(str::to_string))
        .unwrap_or_default()
}
