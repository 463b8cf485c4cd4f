//! One-sentence narration of a query result.

use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::sandbox::QueryResult;
use crate::error::Result;
use crate::llm::{build_narration_messages, CompletionOptions, LlmClient};

/// Turns a result into a short executive summary.
pub struct Narrator {
    client: Arc<dyn LlmClient>,
}

impl Narrator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Single request at the provider's default sampling. The text is not
    /// checked against the result.
    pub async fn narrate(&self, question: &str, result: &QueryResult) -> Result<String> {
        let messages = build_narration_messages(question, &result.render());

        let start = Instant::now();
        let text = self
            .client
            .complete(&messages, &CompletionOptions::default())
            .await?;

        debug!(
            llm_duration_ms = start.elapsed().as_millis(),
            len = text.len(),
            "Narration received"
        );
        Ok(text.trim().to_string())
    }
}
