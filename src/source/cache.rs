//! Freshness-window cache in front of a board source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{BoardSource, RawBoard};
use crate::error::Result;

/// Default freshness window for cached boards.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Caches successful fetches by board id for a fixed freshness window.
///
/// Failed fetches are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, RawBoard)>>,
}

impl<S: BoardSource> CachedSource<S> {
    /// Wraps a source with the given freshness window.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: BoardSource> BoardSource for CachedSource<S> {
    async fn fetch_board(&self, board_id: &str) -> Result<RawBoard> {
        {
            let entries = self.entries.lock().await;
            if let Some((fetched_at, board)) = entries.get(board_id) {
                if fetched_at.elapsed() < self.ttl {
                    debug!(board_id, "Serving board from cache");
                    return Ok(board.clone());
                }
            }
        }

        let board = self.inner.fetch_board(board_id).await?;
        self.entries
            .lock()
            .await
            .insert(board_id.to_string(), (Instant::now(), board.clone()));
        Ok(board)
    }

    async fn invalidate(&self) {
        self.entries.lock().await.clear();
        self.inner.invalidate().await;
    }
}
