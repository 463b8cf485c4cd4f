//! Configuration management.
//!
//! Settings come from an optional TOML file; credentials and board ids come
//! from the environment (after `.env` is loaded). Resolution fails fast when a
//! required credential is missing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AnalystError, Result};
use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS as LLM_TIMEOUT};
use crate::llm::LlmProvider;
use crate::session::BoardIds;
use crate::source::{
    DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_CACHE_TTL_SECS, DEFAULT_PAGE_LIMIT,
    DEFAULT_TIMEOUT_SECS,
};

/// Board API token.
pub const MONDAY_TOKEN_VAR: &str = "MONDAY_TOKEN";
/// Deals board id.
pub const DEALS_BOARD_VAR: &str = "DEALS_BOARD_ID";
/// Work orders board id.
pub const WORK_ORDERS_BOARD_VAR: &str = "WO_BOARD_ID";
/// LLM provider key.
pub const LLM_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Board API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub api_url: String,
    pub api_version: String,
    /// Maximum items fetched per board.
    pub page_limit: u32,
    pub timeout_secs: u64,
    /// How long a fetched board is reused before it is fetched again.
    pub cache_ttl_secs: u64,
    pub deals_board_id: Option<String>,
    pub work_orders_board_id: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            deals_board_id: None,
            work_orders_board_id: None,
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: LLM_TIMEOUT,
        }
    }
}

/// Command-line choices that change which credentials are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Overrides the configured provider.
    pub provider: Option<LlmProvider>,
    /// Boards are served from a local fixtures file, so no token is needed.
    pub offline_source: bool,
}

/// Fully resolved settings.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub source: SourceConfig,
    pub llm: LlmConfig,
    /// None only when boards come from fixtures.
    pub monday_token: Option<String>,
    /// None only for providers that need no key.
    pub llm_api_key: Option<String>,
    pub board_ids: BoardIds,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("source", &self.source)
            .field("llm", &self.llm)
            .field("monday_token", &redact(&self.monday_token))
            .field("llm_api_key", &redact(&self.llm_api_key))
            .field("board_ids", &self.board_ids)
            .finish()
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("board-analyst")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalystError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AnalystError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Combines file settings with values read through `lookup`.
    ///
    /// `lookup` is normally the process environment. Environment board ids
    /// take precedence over the file's. Blank values count as missing.
    pub fn resolve<F>(self, options: ResolveOptions, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Config { source, mut llm } = self;
        if let Some(provider) = options.provider {
            llm.provider = provider;
        }

        validate_url("source.api_url", &source.api_url)?;
        validate_url("llm.base_url", &llm.base_url)?;

        let monday_token = get(MONDAY_TOKEN_VAR);
        if monday_token.is_none() && !options.offline_source {
            return Err(AnalystError::config(format!(
                "{MONDAY_TOKEN_VAR} is not set. Add it to the environment or a .env file."
            )));
        }

        let llm_api_key = get(LLM_API_KEY_VAR);
        if llm_api_key.is_none() && llm.provider.requires_api_key() {
            return Err(AnalystError::config(format!(
                "{LLM_API_KEY_VAR} is not set. Add it to the environment or a .env file."
            )));
        }

        let board_ids = BoardIds {
            deals: get(DEALS_BOARD_VAR).or_else(|| source.deals_board_id.clone()),
            work_orders: get(WORK_ORDERS_BOARD_VAR)
                .or_else(|| source.work_orders_board_id.clone()),
        };

        Ok(Settings {
            source,
            llm,
            monday_token,
            llm_api_key,
            board_ids,
        })
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AnalystError::config(format!("Invalid {key} '{value}': {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AnalystError::config(format!(
            "Invalid {key} '{value}': expected an http or https URL"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            (MONDAY_TOKEN_VAR, "token"),
            (LLM_API_KEY_VAR, "gsk-key"),
            (DEALS_BOARD_VAR, "111"),
            (WORK_ORDERS_BOARD_VAR, "222"),
        ])
    }

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
[source]
page_limit = 100
deals_board_id = "999"

[llm]
provider = "mock"
model = "llama-3.1-8b-instant"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.source.page_limit, 100);
        assert_eq!(config.source.api_url, DEFAULT_API_URL);
        assert_eq!(config.source.deals_board_id.as_deref(), Some("999"));
        assert_eq!(config.llm.provider, LlmProvider::Mock);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.cache_ttl_secs, 300);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::parse_toml("[source\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_reads_environment() {
        let settings = Config::default()
            .resolve(ResolveOptions::default(), full_env())
            .unwrap();

        assert_eq!(settings.monday_token.as_deref(), Some("token"));
        assert_eq!(settings.llm_api_key.as_deref(), Some("gsk-key"));
        assert_eq!(settings.board_ids.deals.as_deref(), Some("111"));
        assert_eq!(settings.board_ids.work_orders.as_deref(), Some("222"));
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let err = Config::default()
            .resolve(ResolveOptions::default(), env(&[(LLM_API_KEY_VAR, "k")]))
            .unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
        assert!(err.to_string().contains(MONDAY_TOKEN_VAR));
    }

    #[test]
    fn test_blank_key_fails_fast() {
        let err = Config::default()
            .resolve(
                ResolveOptions::default(),
                env(&[(MONDAY_TOKEN_VAR, "t"), (LLM_API_KEY_VAR, "   ")]),
            )
            .unwrap_err();
        assert!(err.to_string().contains(LLM_API_KEY_VAR));
    }

    #[test]
    fn test_mock_provider_and_fixtures_need_no_credentials() {
        let settings = Config::default()
            .resolve(
                ResolveOptions {
                    provider: Some(LlmProvider::Mock),
                    offline_source: true,
                },
                env(&[]),
            )
            .unwrap();

        assert_eq!(settings.llm.provider, LlmProvider::Mock);
        assert!(settings.monday_token.is_none());
        assert!(settings.llm_api_key.is_none());
        assert_eq!(settings.board_ids, BoardIds::default());
    }

    #[test]
    fn test_environment_board_ids_override_file() {
        let mut config = Config::default();
        config.source.deals_board_id = Some("from-file".to_string());
        config.source.work_orders_board_id = Some("wo-file".to_string());

        let settings = config
            .resolve(
                ResolveOptions::default(),
                env(&[
                    (MONDAY_TOKEN_VAR, "t"),
                    (LLM_API_KEY_VAR, "k"),
                    (DEALS_BOARD_VAR, "from-env"),
                ]),
            )
            .unwrap();

        assert_eq!(settings.board_ids.deals.as_deref(), Some("from-env"));
        assert_eq!(settings.board_ids.work_orders.as_deref(), Some("wo-file"));
    }

    #[test]
    fn test_missing_board_ids_are_not_fatal() {
        let settings = Config::default()
            .resolve(
                ResolveOptions::default(),
                env(&[(MONDAY_TOKEN_VAR, "t"), (LLM_API_KEY_VAR, "k")]),
            )
            .unwrap();
        assert!(settings.board_ids.deals.is_none());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let mut config = Config::default();
        config.llm.base_url = "ftp://example.com".to_string();

        let err = config
            .resolve(ResolveOptions::default(), full_env())
            .unwrap_err();
        assert!(err.to_string().contains("llm.base_url"));
    }

    #[test]
    fn test_settings_debug_redacts_secrets() {
        let settings = Config::default()
            .resolve(ResolveOptions::default(), full_env())
            .unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("gsk-key"));
        assert!(!debug.contains("\"token\""));
        assert!(debug.contains("<redacted>"));
    }
}
