//! Groq chat-completions narrative generator.
//!
//! Talks to Groq's OpenAI-compatible `/chat/completions` endpoint with a
//! single user message per call. Any non-success status or malformed body
//! maps to `GeneratorError::ApiError`; there is no retry layer.

use super::{GeneratorError, GeneratorResult, NarrativeGenerator};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Groq model used for all narrative tasks.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Default OpenAI-compatible API base.
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Groq-backed narrative generator.
#[derive(Debug, Clone)]
pub struct GroqGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GroqGenerator {
    /// Create a new Groq generator.
    ///
    /// # Arguments
    /// * `api_key` - Groq API key
    /// * `model` - Model name (defaults to `llama-3.1-8b-instant` if None)
    ///
    /// # Errors
    /// Returns `GeneratorError::ConfigError` if the key is empty or the
    /// HTTP client cannot be built
    pub fn new(api_key: String, model: Option<String>) -> GeneratorResult<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a generator against a custom OpenAI-compatible base URL.
    /// Useful for tests and alternative deployments.
    pub fn with_base_url(
        api_key: String,
        model: Option<String>,
        base_url: String,
    ) -> GeneratorResult<Self> {
        if api_key.trim().is_empty() {
            return Err(GeneratorError::ConfigError(
                "Groq API key must not be empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| GeneratorError::ConfigError("Invalid Groq API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                GeneratorError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl NarrativeGenerator for GroqGenerator {
    async fn generate(&self, prompt: &str) -> GeneratorResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::ApiError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GeneratorError::ApiError(format!(
                "Groq returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::ApiError(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::ApiError("Groq returned no choices".to_string()))?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
