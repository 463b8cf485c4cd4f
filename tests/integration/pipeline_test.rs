//! Board normalization and sync tests.

use std::sync::Arc;
use std::time::Duration;

use board_analyst::session::{BoardIds, Session, SourceKind};
use board_analyst::source::{CachedSource, FailingBoardSource, StaticBoardSource};
use board_analyst::table::{ColumnKind, Pipeline, Value};
use pretty_assertions::assert_eq;

use super::common::{
    board_ids, deals_response, static_source, DEALS_BOARD, WORK_ORDERS_BOARD,
};

#[tokio::test]
async fn test_deals_board_is_normalized() {
    let pipeline = Pipeline::new(Arc::new(static_source()));

    let outcome = pipeline.load(Some(DEALS_BOARD)).await;

    assert!(outcome.warning.is_none());
    let table = outcome.table;
    assert_eq!(table.column_names(), vec!["Item Name", "Value", "Stage"]);
    assert_eq!(table.column("Value").unwrap().kind, ColumnKind::Numeric);
    assert_eq!(table.column("Stage").unwrap().kind, ColumnKind::Text);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get(0, "Value"), Some(&Value::Float(1000.0)));
    assert_eq!(table.get(1, "Item Name"), Some(&Value::Text("Globex".to_string())));
}

#[tokio::test]
async fn test_zero_item_board_keeps_columns() {
    let pipeline = Pipeline::new(Arc::new(static_source()));

    let outcome = pipeline.load(Some(WORK_ORDERS_BOARD)).await;

    assert!(outcome.warning.is_none());
    assert_eq!(outcome.table.column_names(), vec!["Item Name", "Deal", "Status"]);
    assert!(outcome.table.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_becomes_empty_table_with_warning() {
    let pipeline = Pipeline::new(Arc::new(FailingBoardSource::new("connection refused")));

    let outcome = pipeline.load(Some(DEALS_BOARD)).await;

    assert_eq!(outcome.table.row_count(), 0);
    assert!(outcome.table.columns().is_empty());
    assert_eq!(
        outcome.warning.as_deref(),
        Some("Fetch Error: connection refused")
    );
}

#[tokio::test]
async fn test_unknown_board_warns_but_sync_completes() {
    let mut session = Session::new();
    let pipeline = Pipeline::new(Arc::new(
        StaticBoardSource::new().with_response(DEALS_BOARD, deals_response()),
    ));

    let report = session.sync(&pipeline, &board_ids()).await;

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, SourceKind::WorkOrders);
    assert!(warnings[0].1.starts_with("Fetch Error: "));

    let tables = session.tables().unwrap();
    assert_eq!(tables.deals.row_count(), 3);
    assert!(tables.work_orders.is_empty());
}

#[tokio::test]
async fn test_cache_serves_repeat_loads_until_sync() {
    let cached = Arc::new(CachedSource::new(static_source(), Duration::from_secs(300)));
    let pipeline = Pipeline::new(cached.clone());

    pipeline.load(Some(DEALS_BOARD)).await;
    pipeline.load(Some(DEALS_BOARD)).await;
    assert_eq!(cached.inner().fetch_count(), 1);

    let mut session = Session::new();
    session
        .sync(
            &pipeline,
            &BoardIds {
                deals: Some(DEALS_BOARD.to_string()),
                work_orders: None,
            },
        )
        .await;
    assert_eq!(cached.inner().fetch_count(), 2);
}

#[tokio::test]
async fn test_sync_replaces_tables() {
    let mut session = Session::new();
    let ids = board_ids();

    let failing = Pipeline::new(Arc::new(FailingBoardSource::new("timeout")));
    session.sync(&failing, &ids).await;
    assert_eq!(session.table(SourceKind::Deals).unwrap().row_count(), 0);

    let working = Pipeline::new(Arc::new(static_source()));
    let report = session.sync(&working, &ids).await;
    assert_eq!(report.warnings().count(), 0);
    assert_eq!(session.table(SourceKind::Deals).unwrap().row_count(), 3);
}
