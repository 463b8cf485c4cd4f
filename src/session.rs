//! Session context holding the canonical table for each board.
//!
//! Tables are absent until the first sync and then replaced wholesale on every
//! sync. Queries only ever borrow a complete `TableSet`.

use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::table::{Pipeline, Table, TableShape};

/// The two boards a session knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Deals,
    WorkOrders,
}

impl SourceKind {
    /// All sources, in sync order.
    pub const ALL: [SourceKind; 2] = [SourceKind::Deals, SourceKind::WorkOrders];

    /// Name the table is bound under when a plan runs.
    pub fn binding_name(&self) -> &'static str {
        match self {
            Self::Deals => "deals",
            Self::WorkOrders => "work_orders",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deals => "Deals",
            Self::WorkOrders => "Work Orders",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Board ids for each source. A missing id syncs as an empty table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardIds {
    pub deals: Option<String>,
    pub work_orders: Option<String>,
}

impl BoardIds {
    pub fn get(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Deals => self.deals.as_deref(),
            SourceKind::WorkOrders => self.work_orders.as_deref(),
        }
    }
}

/// Read-only view of both tables, handed to the query engine.
#[derive(Debug, Clone, Copy)]
pub struct TableSet<'a> {
    pub deals: &'a Arc<Table>,
    pub work_orders: &'a Arc<Table>,
}

impl<'a> TableSet<'a> {
    pub fn get(&self, kind: SourceKind) -> &'a Arc<Table> {
        match kind {
            SourceKind::Deals => self.deals,
            SourceKind::WorkOrders => self.work_orders,
        }
    }

    /// Shapes of both tables under their binding names.
    pub fn shapes(&self) -> Vec<TableShape> {
        SourceKind::ALL
            .iter()
            .map(|kind| self.get(*kind).shape(kind.binding_name()))
            .collect()
    }
}

/// Per-source summary of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub rows: usize,
    pub columns: usize,
    /// Message describing why the table came back empty, if it did.
    pub warning: Option<String>,
}

/// Summary of one sync across both sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub sources: Vec<SourceReport>,
}

impl SyncReport {
    /// Returns the warnings raised during the sync.
    pub fn warnings(&self) -> impl Iterator<Item = (SourceKind, &str)> {
        self.sources
            .iter()
            .filter_map(|s| s.warning.as_deref().map(|w| (s.kind, w)))
    }
}

#[derive(Debug, Clone)]
struct SyncedTables {
    deals: Arc<Table>,
    work_orders: Arc<Table>,
}

/// Holds the most recently synced tables.
#[derive(Debug, Default)]
pub struct Session {
    tables: Option<SyncedTables>,
}

impl Session {
    /// Creates a session with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a sync has completed.
    pub fn is_synced(&self) -> bool {
        self.tables.is_some()
    }

    /// Borrows both tables, or None before the first sync.
    pub fn tables(&self) -> Option<TableSet<'_>> {
        self.tables.as_ref().map(|t| TableSet {
            deals: &t.deals,
            work_orders: &t.work_orders,
        })
    }

    /// Returns one table, or None before the first sync.
    pub fn table(&self, kind: SourceKind) -> Option<&Arc<Table>> {
        self.tables().map(|set| set.get(kind))
    }

    /// Re-fetches both boards from live data and replaces both tables at once.
    ///
    /// The cache is invalidated first. Both fetches run concurrently; the
    /// session is only updated after both have finished.
    pub async fn sync(&mut self, pipeline: &Pipeline, ids: &BoardIds) -> SyncReport {
        pipeline.invalidate().await;

        let (deals, work_orders) = futures::join!(
            pipeline.load(ids.get(SourceKind::Deals)),
            pipeline.load(ids.get(SourceKind::WorkOrders)),
        );

        let report = SyncReport {
            sources: vec![
                SourceReport {
                    kind: SourceKind::Deals,
                    rows: deals.table.row_count(),
                    columns: deals.table.columns().len(),
                    warning: deals.warning,
                },
                SourceReport {
                    kind: SourceKind::WorkOrders,
                    rows: work_orders.table.row_count(),
                    columns: work_orders.table.columns().len(),
                    warning: work_orders.warning,
                },
            ],
        };

        self.tables = Some(SyncedTables {
            deals: Arc::new(deals.table),
            work_orders: Arc::new(work_orders.table),
        });

        info!(
            deals_rows = report.sources[0].rows,
            work_order_rows = report.sources[1].rows,
            "Session synced"
        );
        report
    }
}
