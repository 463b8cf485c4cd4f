//! Shared fixtures.

use std::sync::Arc;

use board_analyst::app::Analyst;
use board_analyst::llm::MockLlmClient;
use board_analyst::session::BoardIds;
use board_analyst::source::StaticBoardSource;
use serde_json::{json, Value};

pub const DEALS_BOARD: &str = "1001";
pub const WORK_ORDERS_BOARD: &str = "2002";

/// Three deals with a money column and a stage.
pub fn deals_response() -> Value {
    json!({ "data": { "boards": [{
        "columns": [
            { "id": "name", "title": "Name" },
            { "id": "numbers", "title": "Value" },
            { "id": "status", "title": "Stage" }
        ],
        "items_page": { "items": [
            { "name": "Acme", "column_values": [
                { "id": "numbers", "text": "$1,000" },
                { "id": "status", "text": "Won" }
            ] },
            { "name": "Globex", "column_values": [
                { "id": "numbers", "text": "2,000" },
                { "id": "status", "text": "Open" }
            ] },
            { "name": "Initech", "column_values": [
                { "id": "numbers", "text": "500" },
                { "id": "status", "text": "Won" }
            ] }
        ] }
    }] } })
}

/// A work-orders board with columns but no items.
pub fn empty_work_orders_response() -> Value {
    json!({ "data": { "boards": [{
        "columns": [
            { "id": "text", "title": "Deal" },
            { "id": "status", "title": "Status" }
        ],
        "items_page": { "items": [] }
    }] } })
}

pub fn board_ids() -> BoardIds {
    BoardIds {
        deals: Some(DEALS_BOARD.to_string()),
        work_orders: Some(WORK_ORDERS_BOARD.to_string()),
    }
}

pub fn static_source() -> StaticBoardSource {
    StaticBoardSource::new()
        .with_response(DEALS_BOARD, deals_response())
        .with_response(WORK_ORDERS_BOARD, empty_work_orders_response())
}

/// An analyst over the fixtures, already synced.
pub async fn synced_analyst(client: MockLlmClient) -> Analyst {
    let mut analyst = Analyst::new(Arc::new(static_source()), Arc::new(client), board_ids());
    let report = analyst.sync().await;
    assert_eq!(report.warnings().count(), 0);
    analyst
}
