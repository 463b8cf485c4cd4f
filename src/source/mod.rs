//! Upstream board sources.
//!
//! Provides a trait-based interface for fetching boards, allowing the live
//! board API, static fixtures, and a caching layer to be used interchangeably.

mod cache;
mod mock;
mod monday;
mod types;

pub use cache::{CachedSource, DEFAULT_CACHE_TTL_SECS};
pub use mock::{FailingBoardSource, StaticBoardSource};
pub use monday::{
    MondayClient, MondayConfig, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_PAGE_LIMIT,
    DEFAULT_TIMEOUT_SECS,
};
pub use types::{ColumnDescriptor, RawBoard, RawItem};

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for board sources.
#[async_trait]
pub trait BoardSource: Send + Sync {
    /// Fetches column metadata and items for one board.
    async fn fetch_board(&self, board_id: &str) -> Result<RawBoard>;

    /// Drops any cached copies so the next fetch observes live data.
    async fn invalidate(&self) {}
}
