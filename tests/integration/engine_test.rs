//! End-to-end question answering over the fixtures.

use board_analyst::llm::MockLlmClient;
use board_analyst::query::{EngineState, QueryResult, AGENT_ERROR_PREFIX, NO_RESULT};
use board_analyst::table::Value;
use pretty_assertions::assert_eq;

use super::common::synced_analyst;

#[tokio::test]
async fn test_total_deal_value() {
    let analyst = synced_analyst(MockLlmClient::new()).await;

    let answer = analyst.ask("What is total deal value?").await;

    assert_eq!(answer.state, EngineState::Done);
    assert_eq!(answer.result, Some(QueryResult::Scalar(Value::Float(3500.0))));
    assert_eq!(answer.text, "The answer is 3500.");
}

#[tokio::test]
async fn test_count_over_empty_work_orders() {
    let analyst = synced_analyst(MockLlmClient::new()).await;

    let answer = analyst.ask("How many work orders are there?").await;

    assert_eq!(answer.state, EngineState::Done);
    assert_eq!(answer.result, Some(QueryResult::Scalar(Value::Int(0))));
}

#[tokio::test]
async fn test_value_by_stage() {
    let analyst = synced_analyst(
        MockLlmClient::new().with_narration("Open", "Open deals lead with 2000 in value."),
    )
    .await;

    let answer = analyst.ask("What is the total value by stage?").await;

    assert_eq!(answer.text, "Open deals lead with 2000 in value.");
    let Some(QueryResult::Table(table)) = answer.result else {
        panic!("expected a table result");
    };
    assert_eq!(table.column_names(), vec!["Stage", "Total"]);
    assert_eq!(table.get(0, "Stage"), Some(&Value::Text("Open".to_string())));
    assert_eq!(table.get(0, "Total"), Some(&Value::Float(2000.0)));
    assert_eq!(table.get(1, "Total"), Some(&Value::Float(1500.0)));
}

#[tokio::test]
async fn test_missing_result_binding() {
    let mock = MockLlmClient::new().with_plan(
        "forgot",
        r#"{"statements":[{"bind":"answer","from":"deals"}]}"#,
    );
    let analyst = synced_analyst(mock.clone()).await;

    let answer = analyst.ask("forgot to bind the result").await;

    assert_eq!(answer.text, NO_RESULT);
    assert_eq!(answer.state, EngineState::Done);
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_unknown_column_is_agent_logic_error() {
    let analyst = synced_analyst(MockLlmClient::new().with_plan(
        "margin",
        r#"{"statements":[{"bind":"result","from":"deals","steps":[
            {"op":"aggregate","func":"mean","column":"Margin"}]}]}"#,
    ))
    .await;

    let answer = analyst.ask("What is the average margin?").await;

    assert_eq!(answer.state, EngineState::Failed);
    assert!(answer.text.starts_with(AGENT_ERROR_PREFIX));
    assert!(answer.text.contains("'Margin'"));
    assert!(answer.snippet.is_some());
}

#[tokio::test]
async fn test_unknown_table_is_agent_logic_error() {
    let analyst = synced_analyst(MockLlmClient::new().with_plan(
        "invoices",
        r#"{"statements":[{"bind":"result","from":"invoices"}]}"#,
    ))
    .await;

    let answer = analyst.ask("How many invoices?").await;

    assert_eq!(
        answer.text,
        format!("{AGENT_ERROR_PREFIX}name 'invoices' is not defined")
    );
}

#[tokio::test]
async fn test_questions_are_independent() {
    let mock = MockLlmClient::new();
    let analyst = synced_analyst(mock.clone()).await;

    analyst.ask("What is total deal value?").await;
    analyst.ask("How many deals?").await;

    let calls = mock.calls();
    assert_eq!(calls.len(), 4);
    // The second plan request carries no trace of the first question.
    assert!(!calls[2]
        .messages
        .iter()
        .any(|m| m.content.contains("total deal value")));
}
