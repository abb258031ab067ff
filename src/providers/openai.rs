use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Provider, request_error};
use crate::translation::classifier::parse_reset_timestamp;

/// Client for OpenAI-compatible chat completion endpoints
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Provider name for logging (openai, openrouter, ollama, vllm)
    name: String,
    /// API key; no Authorization header is sent without one
    api_key: Option<String>,
    /// Base URL, `/chat/completions` is appended
    base_url: String,
    /// Model to request
    model: String,
    /// Temperature for generation
    temperature: f32,
    /// Per-call timeout applied to the HTTP client
    timeout: Duration,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    pub model: String,
    /// The conversation, system prompt first
    pub messages: Vec<ChatMessage>,
    /// Temperature for generation
    pub temperature: f32,
}

/// Message in a chat completion request or response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message; some providers return null
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

impl ChatRequest {
    /// Create the request for one translation unit
    pub fn new(model: impl Into<String>, system_prompt: &str, text: &str, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(system_prompt.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(text.to_string()),
                },
            ],
            temperature,
        }
    }
}

impl OpenAI {
    /// Create a new client for an OpenAI-compatible endpoint
    pub fn new(
        name: impl Into<String>,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            name: name.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.1,
            timeout,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Endpoint for chat completions
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Extract the (trimmed) text of the first choice; empty when absent
    pub fn extract_text(response: &ChatResponse) -> String {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(|content| content.trim().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, system_prompt: &str, text: &str) -> Result<String, ProviderError> {
        let request = ChatRequest::new(&self.model, system_prompt, text, self.temperature);

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let reset = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|value| value.to_str().ok())
                .and_then(parse_reset_timestamp);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.name, status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
                rate_limit_reset_ms: reset,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} response: {}", self.name, e)))?;

        Ok(Self::extract_text(&chat_response))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
