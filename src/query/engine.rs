//! Question answering: plan, execute, narrate.
//!
//! Every question starts at [`EngineState::Idle`] and ends at `Done` or
//! `Failed`. Both end states hand the caller a single string, so callers print
//! an [`Answer`] the same way whether or not it succeeded.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::ir::Plan;
use super::narrator::Narrator;
use super::planner::Planner;
use super::sandbox::{QueryResult, Sandbox, NO_RESULT};
use crate::error::Result;
use crate::llm::LlmClient;
use crate::session::TableSet;

/// Prefix of the text returned when a question fails.
pub const AGENT_ERROR_PREFIX: &str = "⚠️ Agent Logic Error: ";

/// Stage of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Planning,
    Executing,
    Narrating,
    Done,
    Failed,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Narrating => "narrating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One question against the current tables.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
    pub tables: TableSet<'a>,
}

/// What the engine hands back for a question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Narration on success, or the agent-logic message on failure.
    pub text: String,
    /// Generated snippet, when planning got that far.
    pub snippet: Option<String>,
    /// Terminal state reached.
    pub state: EngineState,
    /// Executed result, on success.
    pub result: Option<QueryResult>,
}

impl Answer {
    pub fn is_success(&self) -> bool {
        self.state == EngineState::Done
    }
}

/// Tracks the state of one run and what it has produced so far.
struct Progress {
    state: EngineState,
    snippet: Option<String>,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: EngineState::Idle,
            snippet: None,
        }
    }

    fn advance(&mut self, next: EngineState) {
        debug!(from = %self.state, to = %next, "Engine state");
        self.state = next;
    }
}

/// Orchestrates planner, sandbox and narrator.
///
/// Holds no state between questions.
pub struct QueryEngine {
    planner: Planner,
    narrator: Narrator,
}

impl QueryEngine {
    /// Creates an engine that uses `client` for both planning and narration.
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            planner: Planner::new(Arc::clone(&client)),
            narrator: Narrator::new(client),
        }
    }

    /// Answers one question. Never fails; failures come back as text.
    pub async fn ask(&self, request: QueryRequest<'_>) -> Answer {
        let start = Instant::now();
        let mut progress = Progress::new();

        match self.run(&request, &mut progress).await {
            Ok((text, result)) => {
                progress.advance(EngineState::Done);
                info!(
                    duration_ms = start.elapsed().as_millis(),
                    state = %progress.state,
                    "Question answered"
                );
                Answer {
                    text,
                    snippet: progress.snippet,
                    state: progress.state,
                    result: Some(result),
                }
            }
            Err(e) => {
                let failed_in = progress.state;
                progress.advance(EngineState::Failed);
                warn!(
                    state = %failed_in,
                    category = e.category(),
                    error = %e,
                    "Question failed"
                );
                Answer {
                    text: format!("{AGENT_ERROR_PREFIX}{}", e.message()),
                    snippet: progress.snippet,
                    state: progress.state,
                    result: None,
                }
            }
        }
    }

    async fn run(
        &self,
        request: &QueryRequest<'_>,
        progress: &mut Progress,
    ) -> Result<(String, QueryResult)> {
        progress.advance(EngineState::Planning);
        let snippet = self
            .planner
            .generate(request.question, &request.tables.shapes())
            .await?;
        progress.snippet = Some(snippet.clone());

        progress.advance(EngineState::Executing);
        let plan = Plan::parse(&snippet)?;
        debug!(
            statements = plan.statements.len(),
            binds_result = plan.binds_result(),
            "Running plan"
        );
        let result = Sandbox::new(&request.tables).run(&plan)?;

        // Nothing to narrate.
        if result.is_no_result() {
            return Ok((NO_RESULT.to_string(), result));
        }

        progress.advance(EngineState::Narrating);
        let text = self.narrator.narrate(request.question, &result).await?;
        Ok((text, result))
    }
}
