//! Completion provider abstraction for the online detector.
//!
//! The detector only ever needs one narrow call: prompt in, one short
//! text reply out. Keeping providers behind [`CompletionProvider`] means
//! they are swappable without touching detection logic.

use async_trait::async_trait;
use diff_core::DetectError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::OnlineConfig;

/// Prompt-in, single-short-text-out contract.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DetectError>;
}

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Messages API types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic messages API client.
pub struct AnthropicProvider {
    endpoint: String,
    model: String,
    api_key: String,
    http: Client,
}

impl AnthropicProvider {
    pub fn new(config: &OnlineConfig) -> Result<Self, DetectError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DetectError::Provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: config.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, DetectError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            // Only a short reply is ever needed
            max_tokens: 100,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| DetectError::Provider(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::Provider(format!(
                "API returned status {status}: {body}"
            )));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DetectError::Provider(format!("failed to decode response: {e}")))?;

        let text = reply
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .ok_or_else(|| DetectError::Provider("empty response from API".to_string()))?;

        Ok(text.trim().to_string())
    }
}
