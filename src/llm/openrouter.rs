use log::info;
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";

/// Upstream OpenAI-compatible chat-completions API the proxy forwards to.
pub struct OpenRouterClient {
    http: HttpClient,
    model: String,
    url: String,
}

#[derive(Serialize)]
struct OpenRouterChatRequest<'a> {
    model: &'a str,
    messages: &'a Value,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Status and JSON body relayed back to the caller unchanged.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl OpenRouterClient {
    pub fn new(
        api_key: &str,
        model: Option<String>,
        url: Option<String>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = url.unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        Url::parse(&url).map_err(|e| format!("Invalid upstream URL '{}': {}", url, e))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, model, url })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn forward(
        &self,
        messages: &Value,
        temperature: f32,
        max_tokens: Option<u32>
    ) -> Result<UpstreamReply, reqwest::Error> {
        let req = OpenRouterChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let resp = self.http.post(&self.url).json(&req).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            info!("Upstream answered {} for model {}", status, self.model);
        }

        let body = serde_json
            ::from_str::<Value>(&text)
            .unwrap_or_else(|_| serde_json::json!({ "error": text }));

        Ok(UpstreamReply { status, body })
    }
}
