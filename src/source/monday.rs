//! Board API client.
//!
//! Issues one parametrized GraphQL query per board against the monday.com API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{AnalystError, Result};
use crate::source::{BoardSource, RawBoard};

/// Default board API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Default API version header value.
pub const DEFAULT_API_VERSION: &str = "2023-10";

/// Default maximum number of items requested per board.
pub const DEFAULT_PAGE_LIMIT: u32 = 500;

/// Default timeout for board requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BOARD_QUERY: &str = r#"query ($ids: [ID!], $limit: Int!) {
  boards (ids: $ids) {
    columns { id title }
    items_page (limit: $limit) {
      items {
        name
        column_values { id text }
      }
    }
  }
}"#;

/// Board API client configuration.
#[derive(Clone)]
pub struct MondayConfig {
    /// API token sent in the Authorization header.
    pub token: String,
    pub api_url: String,
    pub api_version: String,
    pub page_limit: u32,
    pub timeout_secs: u64,
}

impl MondayConfig {
    /// Creates a config with the given token and default endpoint settings.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the API version header value.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the item page size.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl std::fmt::Debug for MondayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondayConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("page_limit", &self.page_limit)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Board API client.
#[derive(Debug, Clone)]
pub struct MondayClient {
    config: MondayConfig,
    client: Client,
}

impl MondayClient {
    /// Creates a new board client with the given configuration.
    pub fn new(config: MondayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalystError::upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn build_request<'a>(&self, board_id: &'a str) -> GraphQlRequest<'a> {
        GraphQlRequest {
            query: BOARD_QUERY,
            variables: BoardVariables {
                ids: vec![board_id],
                limit: self.config.page_limit,
            },
        }
    }

    fn request_error(error: reqwest::Error) -> AnalystError {
        if error.is_timeout() {
            AnalystError::upstream("Board request timed out")
        } else if error.is_connect() {
            AnalystError::upstream("Failed to connect to the board API. Check your network.")
        } else {
            AnalystError::upstream(format!("Board request failed: {}", error))
        }
    }
}

#[async_trait]
impl BoardSource for MondayClient {
    async fn fetch_board(&self, board_id: &str) -> Result<RawBoard> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", &self.config.token)
            .header("API-Version", &self.config.api_version)
            .header("Content-Type", "application/json")
            .json(&self.build_request(board_id))
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalystError::upstream(format!("Failed to read response: {}", e)))?;

        debug!(
            board_id,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Board API responded"
        );

        // Error payloads carry their own message, so read the body before checking status.
        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(AnalystError::upstream(format!(
                    "Board API error ({}): {}",
                    status, body
                )))
            }
            Err(e) => {
                return Err(AnalystError::upstream(format!(
                    "Malformed board response: {}",
                    e
                )))
            }
        };

        let board = RawBoard::from_response(value);
        if board.is_ok() && !status.is_success() {
            return Err(AnalystError::upstream(format!("Board API error ({})", status)));
        }
        board
    }
}

// GraphQL request types

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: BoardVariables<'a>,
}

#[derive(Debug, Serialize)]
struct BoardVariables<'a> {
    ids: Vec<&'a str>,
    limit: u32,
}
