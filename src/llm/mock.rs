//! Mock LLM client for testing.
//!
//! Provides deterministic plans and narrations based on input patterns, and
//! records every call so tests can inspect prompts and sampling options.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{AnalystError, Result};
use crate::llm::prompt::NARRATION_INSTRUCTION;
use crate::llm::types::{CompletionOptions, Message, Role};
use crate::llm::LlmClient;

const TOTAL_DEAL_VALUE_PLAN: &str = r#"```json
{"statements": [
  {"bind": "result", "from": "deals",
   "steps": [{"op": "aggregate", "func": "sum", "column": "Value"}]}
]}
```"#;

const COUNT_DEALS_PLAN: &str = r#"{"statements": [
  {"bind": "result", "from": "deals", "steps": [{"op": "aggregate", "func": "count"}]}
]}"#;

const COUNT_WORK_ORDERS_PLAN: &str = r#"{"statements": [
  {"bind": "result", "from": "work_orders", "steps": [{"op": "aggregate", "func": "count"}]}
]}"#;

const VALUE_BY_STAGE_PLAN: &str = r#"{"statements": [
  {"bind": "result", "from": "deals", "steps": [
    {"op": "group_by", "keys": ["Stage"], "aggregates": [{"func": "sum", "column": "Value", "as": "Total"}]},
    {"op": "sort", "by": "Total", "descending": true}
  ]}
]}"#;

/// One recorded `complete` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl RecordedCall {
    /// Returns true if this call asked for a narration rather than a plan.
    pub fn is_narration(&self) -> bool {
        is_narration_request(&self.messages)
    }
}

/// Mock LLM client that returns canned responses based on input patterns.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Plan responses (pattern -> response), checked before the defaults.
    plans: Vec<(String, String)>,
    /// Narration responses (pattern -> response), checked before the default.
    narrations: Vec<(String, String)>,
    /// When set, every call fails with this message.
    failure: Option<String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// When a planning request contains `pattern`, respond with `response`.
    pub fn with_plan(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.plans.push((pattern.into(), response.into()));
        self
    }

    /// When a narration request contains `pattern`, respond with `response`.
    pub fn with_narration(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.narrations.push((pattern.into(), response.into()));
        self
    }

    /// Makes every call fail with an LLM error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Returns the calls made so far. Clones share the same record.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn plan_response(&self, input: &str) -> String {
        let input_lower = question_of(input).to_lowercase();

        if let Some(response) = find_match(&self.plans, &input_lower) {
            return response;
        }

        if input_lower.contains("total") && input_lower.contains("value") {
            if input_lower.contains("stage") {
                return VALUE_BY_STAGE_PLAN.to_string();
            }
            return TOTAL_DEAL_VALUE_PLAN.to_string();
        }

        if input_lower.contains("how many") || input_lower.contains("count") {
            if input_lower.contains("work order") {
                return COUNT_WORK_ORDERS_PLAN.to_string();
            }
            return COUNT_DEALS_PLAN.to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }

    fn narration_response(&self, input: &str) -> String {
        if let Some(response) = find_match(&self.narrations, &input.to_lowercase()) {
            return response;
        }

        let result = input
            .lines()
            .find_map(|line| line.strip_prefix("Result: "))
            .unwrap_or_default();
        format!("The answer is {}.", result.trim())
    }

    fn record(&self, messages: &[Message], options: &CompletionOptions) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                messages: messages.to_vec(),
                temperature: options.temperature,
            });
    }
}

fn find_match(patterns: &[(String, String)], input_lower: &str) -> Option<String> {
    patterns
        .iter()
        .find(|(pattern, _)| input_lower.contains(&pattern.to_lowercase()))
        .map(|(_, response)| response.clone())
}

/// The quoted question of a planning prompt, or the whole input.
fn question_of(input: &str) -> &str {
    input
        .lines()
        .find_map(|line| line.strip_prefix("User Query: \""))
        .map(|rest| rest.strip_suffix('"').unwrap_or(rest))
        .unwrap_or(input)
}

fn last_user_message(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

fn is_narration_request(messages: &[Message]) -> bool {
    last_user_message(messages)
        .trim_end()
        .ends_with(NARRATION_INSTRUCTION)
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> Result<String> {
        self.record(messages, options);

        if let Some(message) = &self.failure {
            return Err(AnalystError::llm(message.clone()));
        }

        let input = last_user_message(messages);
        if is_narration_request(messages) {
            Ok(self.narration_response(input))
        } else {
            Ok(self.plan_response(input))
        }
    }
}
