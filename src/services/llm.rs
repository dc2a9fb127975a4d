//! Chat-completion client for the itinerary seed service.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default). One request per call; retry policy belongs to the planner.

use crate::constants::*;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// One system + one user instruction, answered with a single message
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    /// Ask the service to constrain its output to a single JSON object
    pub json_object: bool,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the raw text of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self::with_config(
            api_key,
            DEFAULT_LLM_BASE_URL.to_string(),
            DEFAULT_LLM_MODEL.to_string(),
            Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECONDS),
        )
    }

    pub fn with_config(api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        GroqClient {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": request.temperature,
        });

        if request.json_object {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        tracing::debug!(
            model = %self.model,
            temperature = request.temperature,
            "Chat completion request to {}",
            url
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::AiService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                "Chat completion HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::AiService(format!("HTTP {}: {}", status, error_text)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiFormat(format!("Failed to parse completion envelope: {}", e)))?;

        Ok(completion.first_content().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
    }
}
