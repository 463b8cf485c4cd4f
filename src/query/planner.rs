//! Plan generation.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::Result;
use crate::llm::{build_plan_messages, strip_code_fences, CompletionOptions, LlmClient};
use crate::table::TableShape;

/// Asks the model for a plan answering one question.
pub struct Planner {
    client: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Returns the generated snippet with any code fences removed.
    ///
    /// Only the table shapes are sent. The request is made once at
    /// deterministic sampling; the snippet is not validated here.
    pub async fn generate(&self, question: &str, shapes: &[TableShape]) -> Result<String> {
        let messages = build_plan_messages(question, shapes);
        debug!(
            tables = shapes.len(),
            prompt_len = messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Requesting plan"
        );

        let start = Instant::now();
        let raw = self
            .client
            .complete(&messages, &CompletionOptions::deterministic())
            .await?;
        let snippet = strip_code_fences(&raw);

        info!(
            llm_duration_ms = start.elapsed().as_millis(),
            snippet = %snippet,
            "Generated plan"
        );
        Ok(snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn shapes() -> Vec<TableShape> {
        vec![TableShape {
            name: "deals".to_string(),
            columns: vec!["Item Name".to_string(), "Value".to_string()],
            row_count: 3,
        }]
    }

    #[tokio::test]
    async fn test_generate_strips_fences() {
        let planner = Planner::new(Arc::new(MockLlmClient::new()));
        let snippet = planner
            .generate("What is total deal value?", &shapes())
            .await
            .unwrap();
        assert!(snippet.starts_with('{'));
        assert!(snippet.ends_with('}'));
    }

    #[tokio::test]
    async fn test_generate_is_deterministic_and_sends_shapes_only() {
        let mock = MockLlmClient::new();
        let planner = Planner::new(Arc::new(mock.clone()));

        planner.generate("count deals", &shapes()).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, Some(0.0));
        let prompt = &calls[0].messages[1].content;
        assert!(prompt.contains("deals (3 rows): [Item Name, Value]"));
    }

    #[tokio::test]
    async fn test_generate_propagates_llm_failure() {
        let planner = Planner::new(Arc::new(MockLlmClient::new().with_failure("timed out")));
        let err = planner.generate("q", &shapes()).await.unwrap_err();
        assert!(err.is_agent_logic());
    }
}
