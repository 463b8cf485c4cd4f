//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{AnalystError, Result};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates an LLM client for the configured provider.
///
/// The OpenAI-compatible provider requires `api_key`; the mock ignores it.
pub fn create_client(config: &LlmConfig, api_key: Option<&str>) -> Result<Arc<dyn LlmClient>> {
    match config.provider {
        LlmProvider::OpenAi => {
            let key = api_key.ok_or_else(|| {
                AnalystError::config("No API key configured for the LLM provider.")
            })?;
            let openai = OpenAiConfig::new(key, &config.model)
                .with_base_url(&config.base_url)
                .with_timeout(config.timeout_secs);
            Ok(Arc::new(OpenAiClient::new(openai)?))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_client() {
        let config = LlmConfig {
            provider: LlmProvider::Mock,
            ..LlmConfig::default()
        };
        assert!(create_client(&config, None).is_ok());
    }

    #[test]
    fn test_create_openai_without_key_fails() {
        let err = create_client(&LlmConfig::default(), None).err().unwrap();
        assert!(matches!(err, AnalystError::Config(_)));
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn test_create_openai_with_key() {
        assert!(create_client(&LlmConfig::default(), Some("gsk-test")).is_ok());
    }
}
