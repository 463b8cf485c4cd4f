//! OpenAI-compatible chat completions client.
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (Groq, OpenAI, local gateways). Each call is a single request; failures
//! are returned to the caller as they are.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{AnalystError, Result};
use crate::llm::types::{CompletionOptions, Message};
use crate::llm::LlmClient;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client configuration.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,
    pub model: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Full URL of the completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI-compatible LLM client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalystError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Converts internal messages to the wire format.
    fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message], options: &CompletionOptions) -> OpenAiRequest {
        OpenAiRequest {
            model: self.config.model.clone(),
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
        }
    }

    /// Maps a non-success response to an error.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> AnalystError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AnalystError::llm("Authentication failed. Check your GROQ_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AnalystError::llm("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            return AnalystError::llm(format!("LLM API error: {}", error_response.error.message));
        }

        AnalystError::llm(format!("LLM API error ({}): {}", status, body))
    }

    fn request_error(error: reqwest::Error) -> AnalystError {
        if error.is_timeout() {
            AnalystError::llm("Request timed out. Try again.")
        } else if error.is_connect() {
            AnalystError::llm("Failed to connect to the LLM API. Check your network.")
        } else {
            AnalystError::llm(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> Result<String> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.config.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(messages, options))
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalystError::llm(format!("Failed to read response: {}", e)))?;

        debug!(
            model = %self.config.model,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "LLM API responded"
        );

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let response: OpenAiResponse = serde_json::from_str(&body)
            .map_err(|e| AnalystError::llm(format!("Failed to parse response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnalystError::llm("No response from the LLM API"))
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
