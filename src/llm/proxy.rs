use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use std::error::Error as StdError;
use url::Url;

use super::{ extract_error_detail, extract_reply, ChatClient, ChatCompletionRequest };
use crate::error::ChatError;

/// Talks to the `/api/chat` proxy that fronts the language model.
pub struct ProxyClient {
    http: HttpClient,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(endpoint: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let url = Url::parse(endpoint).map_err(|e|
            format!("Invalid proxy endpoint '{}': {}", endpoint, e)
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            endpoint: url.to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for ProxyClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatError> {
        debug!("POST {} with {} messages", self.endpoint, request.messages.len());

        let resp = self.http.post(&self.endpoint).json(request).send().await?;
        let status = resp.status();
        let body = resp.bytes().await;

        if !status.is_success() {
            let detail = body
                .map(|b| extract_error_detail(&b))
                .unwrap_or_default();
            return Err(ChatError::RequestFailed {
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                detail,
            });
        }

        extract_reply(&body?)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
