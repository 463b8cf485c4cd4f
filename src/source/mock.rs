//! Static board sources for testing and offline runs.
//!
//! `StaticBoardSource` serves raw API responses from memory or a fixtures file;
//! `FailingBoardSource` always fails.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BoardSource, RawBoard};
use crate::error::{AnalystError, Result};

/// A board source that answers from canned API responses keyed by board id.
#[derive(Debug, Default)]
pub struct StaticBoardSource {
    responses: HashMap<String, serde_json::Value>,
    fetches: AtomicUsize,
}

impl StaticBoardSource {
    /// Creates a source with no boards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw API response for the given board id.
    pub fn with_response(mut self, board_id: impl Into<String>, body: serde_json::Value) -> Self {
        self.responses.insert(board_id.into(), body);
        self
    }

    /// Loads a JSON object mapping board id to raw API response.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalystError::config(format!(
                "Failed to read fixtures file {}: {e}",
                path.display()
            ))
        })?;

        let responses: HashMap<String, serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| {
                AnalystError::config(format!(
                    "Invalid fixtures file {}: {e}",
                    path.display()
                ))
            })?;

        Ok(Self {
            responses,
            fetches: AtomicUsize::new(0),
        })
    }

    /// Returns how many fetches reached this source.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoardSource for StaticBoardSource {
    async fn fetch_board(&self, board_id: &str) -> Result<RawBoard> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let body = self
            .responses
            .get(board_id)
            .cloned()
            .ok_or_else(|| AnalystError::upstream(format!("Board not found: {board_id}")))?;
        RawBoard::from_response(body)
    }
}

/// A board source whose every fetch fails with the same upstream error.
#[derive(Debug, Clone)]
pub struct FailingBoardSource {
    message: String,
}

impl FailingBoardSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl BoardSource for FailingBoardSource {
    async fn fetch_board(&self, _board_id: &str) -> Result<RawBoard> {
        Err(AnalystError::upstream(self.message.clone()))
    }
}
