//! Application wiring.
//!
//! [`Analyst`] owns the session, the normalization pipeline and the query
//! engine, and exposes the two caller actions: sync and ask.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{AnalystError, Result};
use crate::llm::{create_client, LlmClient};
use crate::query::{Answer, EngineState, QueryEngine, QueryRequest};
use crate::session::{BoardIds, Session, SourceKind, SyncReport};
use crate::source::{BoardSource, CachedSource, MondayClient, MondayConfig, StaticBoardSource};
use crate::table::Pipeline;

/// Text returned when a question is asked before any sync.
pub const NOT_SYNCED: &str = "No data synced yet. Run /sync to begin.";

/// The question-answering application.
pub struct Analyst {
    session: Session,
    pipeline: Pipeline,
    engine: QueryEngine,
    board_ids: BoardIds,
}

impl Analyst {
    /// Creates an analyst over the given source and model client.
    pub fn new(source: Arc<dyn BoardSource>, client: Arc<dyn LlmClient>, board_ids: BoardIds) -> Self {
        Self {
            session: Session::new(),
            pipeline: Pipeline::new(source),
            engine: QueryEngine::new(client),
            board_ids,
        }
    }

    /// Builds the board source and model client from resolved settings.
    ///
    /// With `fixtures`, boards are served from that file instead of the API.
    /// Either way the source sits behind the freshness-window cache.
    pub fn from_settings(settings: &Settings, fixtures: Option<&Path>) -> Result<Self> {
        let ttl = Duration::from_secs(settings.source.cache_ttl_secs);

        let source: Arc<dyn BoardSource> = match fixtures {
            Some(path) => {
                info!(path = %path.display(), "Serving boards from fixtures");
                Arc::new(CachedSource::new(StaticBoardSource::from_json_file(path)?, ttl))
            }
            None => {
                let token = settings
                    .monday_token
                    .as_deref()
                    .ok_or_else(|| AnalystError::config("No board API token configured."))?;
                let config = MondayConfig::new(token)
                    .with_api_url(&settings.source.api_url)
                    .with_api_version(&settings.source.api_version)
                    .with_page_limit(settings.source.page_limit)
                    .with_timeout(settings.source.timeout_secs);
                Arc::new(CachedSource::new(MondayClient::new(config)?, ttl))
            }
        };

        let client = create_client(&settings.llm, settings.llm_api_key.as_deref())?;
        info!(provider = %settings.llm.provider, model = %settings.llm.model, "LLM client ready");

        Ok(Self::new(source, client, settings.board_ids.clone()))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Re-fetches both boards from live data and replaces the session tables.
    pub async fn sync(&mut self) -> SyncReport {
        let report = self.session.sync(&self.pipeline, &self.board_ids).await;
        for (kind, warning) in report.warnings() {
            warn!(source = %kind, warning, "Sync warning");
        }
        report
    }

    /// Answers one question against the current tables.
    pub async fn ask(&self, question: &str) -> Answer {
        let Some(tables) = self.session.tables() else {
            return Answer {
                text: NOT_SYNCED.to_string(),
                snippet: None,
                state: EngineState::Idle,
                result: None,
            };
        };

        self.engine.ask(QueryRequest { question, tables }).await
    }

    /// Renders the first `rows` rows of one table, or None before the first sync.
    pub fn preview(&self, kind: SourceKind, rows: usize) -> Option<String> {
        let table = self.session.table(kind)?;
        if table.columns().is_empty() {
            return Some(format!("{kind}: (empty)"));
        }
        Some(format!(
            "{kind} ({} rows)\n{}",
            table.row_count(),
            table.render(rows)
        ))
    }
}
