//! Normalization pipeline: fetch, flatten, sanitize, classify, coerce.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::classify::{coerce_amount, sanitize_title, ColumnClassifier, KeywordClassifier};
use super::flatten::flatten;
use super::{Column, ColumnKind, Table, Value};
use crate::source::{BoardSource, RawBoard};

/// Result of loading one board: always a table, plus a message if the fetch failed.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub table: Table,
    pub warning: Option<String>,
}

/// Builds canonical tables from a board source.
pub struct Pipeline {
    source: Arc<dyn BoardSource>,
    classifier: Arc<dyn ColumnClassifier>,
}

impl Pipeline {
    /// Creates a pipeline using the keyword classifier.
    pub fn new(source: Arc<dyn BoardSource>) -> Self {
        Self::with_classifier(source, Arc::new(KeywordClassifier))
    }

    /// Creates a pipeline with a custom column classifier.
    pub fn with_classifier(
        source: Arc<dyn BoardSource>,
        classifier: Arc<dyn ColumnClassifier>,
    ) -> Self {
        Self { source, classifier }
    }

    /// Drops cached boards so the next load observes live data.
    pub async fn invalidate(&self) {
        self.source.invalidate().await;
    }

    /// Fetches and normalizes one board.
    ///
    /// Never fails: any upstream problem yields an empty table and a warning.
    pub async fn load(&self, board_id: Option<&str>) -> SyncOutcome {
        let Some(board_id) = board_id else {
            warn!("No board id configured; using an empty table");
            return SyncOutcome {
                table: Table::default(),
                warning: Some("Fetch Error: no board id configured".to_string()),
            };
        };

        let start = Instant::now();
        match self.source.fetch_board(board_id).await {
            Ok(board) => {
                let table = normalize(&board, self.classifier.as_ref());
                info!(
                    board_id,
                    rows = table.row_count(),
                    columns = table.columns().len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Board normalized"
                );
                SyncOutcome {
                    table,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(board_id, error = %e, "Board fetch failed; using an empty table");
                SyncOutcome {
                    table: Table::default(),
                    warning: Some(format!("Fetch Error: {}", e.message())),
                }
            }
        }
    }
}

/// Converts a fetched board into a canonical table.
pub fn normalize(board: &RawBoard, classifier: &dyn ColumnClassifier) -> Table {
    let flat = flatten(board);

    let columns: Vec<Column> = unique_titles(flat.titles.iter().map(|t| sanitize_title(t)))
        .into_iter()
        .map(|name| {
            let kind = classifier.classify(&name);
            Column::new(name, kind)
        })
        .collect();

    let rows = flat
        .rows
        .into_iter()
        .map(|cells| {
            cells
                .into_iter()
                .zip(&columns)
                .map(|(text, column)| match column.kind {
                    ColumnKind::Numeric => Value::Float(coerce_amount(&text)),
                    ColumnKind::Text => Value::Text(text),
                })
                .collect()
        })
        .collect();

    Table::with_rows(columns, rows)
}

/// Makes sanitized titles unique by suffixing repeats with ` 2`, ` 3`, ...
///
/// Titles that sanitize to nothing are named `Unnamed <position>`.
fn unique_titles(titles: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .enumerate()
        .map(|(idx, title)| {
            let base = if title.is_empty() {
                format!("Unnamed {idx}")
            } else {
                title
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while seen.contains(&candidate) {
                candidate = format!("{base} {n}");
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}
