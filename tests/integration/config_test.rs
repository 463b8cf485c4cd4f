//! Configuration loading and startup wiring.

use std::collections::HashMap;
use std::io::Write;

use board_analyst::app::Analyst;
use board_analyst::config::{Config, ResolveOptions};
use board_analyst::error::AnalystError;
use board_analyst::llm::LlmProvider;
use board_analyst::query::EngineState;
use tempfile::NamedTempFile;

use super::common::{deals_response, empty_work_orders_response, DEALS_BOARD, WORK_ORDERS_BOARD};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn fixtures_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let body = serde_json::json!({
        DEALS_BOARD: deals_response(),
        WORK_ORDERS_BOARD: empty_work_orders_response(),
    });
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn test_missing_token_fails_fast() {
    let err = Config::default()
        .resolve(ResolveOptions::default(), env(&[("GROQ_API_KEY", "k")]))
        .unwrap_err();

    assert!(matches!(err, AnalystError::Config(_)));
    assert!(err.to_string().contains("MONDAY_TOKEN"));
}

#[test]
fn test_missing_llm_key_fails_fast() {
    let err = Config::default()
        .resolve(
            ResolveOptions::default(),
            env(&[("MONDAY_TOKEN", "t")]),
        )
        .unwrap_err();

    assert!(err.to_string().contains("GROQ_API_KEY"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[source]
cache_ttl_secs = 60
deals_board_id = "from-file"

[llm]
model = "llama-3.1-8b-instant"
"#
    )
    .unwrap();

    let settings = Config::load_from_file(file.path())
        .unwrap()
        .resolve(
            ResolveOptions::default(),
            env(&[
                ("MONDAY_TOKEN", "t"),
                ("GROQ_API_KEY", "k"),
                ("WO_BOARD_ID", "from-env"),
            ]),
        )
        .unwrap();

    assert_eq!(settings.source.cache_ttl_secs, 60);
    assert_eq!(settings.llm.model, "llama-3.1-8b-instant");
    assert_eq!(settings.board_ids.deals.as_deref(), Some("from-file"));
    assert_eq!(settings.board_ids.work_orders.as_deref(), Some("from-env"));
}

#[tokio::test]
async fn test_offline_run_from_fixtures() {
    let fixtures = fixtures_file();
    let settings = Config::default()
        .resolve(
            ResolveOptions {
                provider: Some(LlmProvider::Mock),
                offline_source: true,
            },
            env(&[("DEALS_BOARD_ID", DEALS_BOARD), ("WO_BOARD_ID", WORK_ORDERS_BOARD)]),
        )
        .unwrap();

    let mut analyst = Analyst::from_settings(&settings, Some(fixtures.path())).unwrap();
    let report = analyst.sync().await;
    assert_eq!(report.warnings().count(), 0);

    let answer = analyst.ask("How many deals are there?").await;
    assert_eq!(answer.state, EngineState::Done);
    assert_eq!(answer.text, "The answer is 3.");
}

#[test]
fn test_unreadable_fixtures_is_config_error() {
    let settings = Config::default()
        .resolve(
            ResolveOptions {
                provider: Some(LlmProvider::Mock),
                offline_source: true,
            },
            env(&[]),
        )
        .unwrap();

    let result = Analyst::from_settings(
        &settings,
        Some(std::path::Path::new("/nonexistent/fixtures.json")),
    );

    assert!(matches!(result, Err(AnalystError::Config(_))));
}
