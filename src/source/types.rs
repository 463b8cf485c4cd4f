//! Board payload types.
//!
//! Wire structures mirror the board API response; `RawBoard` is the
//! transport-independent form the table pipeline consumes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AnalystError, Result};

/// Title of the board's built-in item name column, which is handled separately.
const NAME_COLUMN_TITLE: &str = "name";

/// A board column as known to the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Opaque column identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
}

impl ColumnDescriptor {
    /// Creates a new column descriptor.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One upstream item: a name plus its column values keyed by column id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub name: String,
    pub values: HashMap<String, String>,
}

impl RawItem {
    /// Creates an item with no column values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Adds a column value.
    pub fn with_value(mut self, column_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.values.insert(column_id.into(), text.into());
        self
    }
}

/// A fetched board: column metadata (without the name column) plus items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBoard {
    pub columns: Vec<ColumnDescriptor>,
    pub items: Vec<RawItem>,
}

impl RawBoard {
    /// Reads a board out of a raw API response body.
    ///
    /// An error list in the response, a missing `data` section, or a board id
    /// that matched nothing all become upstream errors.
    pub fn from_response(body: serde_json::Value) -> Result<Self> {
        let response: BoardResponse = serde_json::from_value(body)
            .map_err(|e| AnalystError::upstream(format!("Malformed board response: {e}")))?;

        if let Some(error) = response.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(AnalystError::upstream(format!(
                "Monday API error: {}",
                error.message
            )));
        }

        if let Some(message) = response.error_message {
            return Err(AnalystError::upstream(format!("Monday API error: {message}")));
        }

        let data = response
            .data
            .ok_or_else(|| AnalystError::upstream("Board response has no data"))?;

        let board = data
            .boards
            .into_iter()
            .next()
            .ok_or_else(|| AnalystError::upstream("Board not found"))?;

        let columns = board
            .columns
            .into_iter()
            .filter(|c| c.title.to_lowercase() != NAME_COLUMN_TITLE)
            .collect();

        let items = board
            .items_page
            .items
            .into_iter()
            .map(|item| RawItem {
                name: item.name,
                values: item
                    .column_values
                    .into_iter()
                    .map(|v| (v.id, v.text.unwrap_or_default()))
                    .collect(),
            })
            .collect();

        Ok(Self { columns, items })
    }
}

// Board API wire types

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    data: Option<BoardData>,
    #[serde(default)]
    errors: Option<Vec<ApiError>>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BoardData {
    #[serde(default)]
    boards: Vec<WireBoard>,
}

#[derive(Debug, Deserialize)]
struct WireBoard {
    #[serde(default)]
    columns: Vec<ColumnDescriptor>,
    items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    name: String,
    #[serde(default)]
    column_values: Vec<WireColumnValue>,
}

#[derive(Debug, Deserialize)]
struct WireColumnValue {
    id: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> serde_json::Value {
        json!({
            "data": {
                "boards": [{
                    "columns": [
                        { "id": "name", "title": "Name" },
                        { "id": "numbers", "title": "Deal Value ($)" },
                        { "id": "status", "title": "Stage" }
                    ],
                    "items_page": {
                        "items": [
                            {
                                "name": "Acme renewal",
                                "column_values": [
                                    { "id": "numbers", "text": "$1,200.50" },
                                    { "id": "status", "text": "Won" }
                                ]
                            },
                            {
                                "name": "Globex pilot",
                                "column_values": [
                                    { "id": "numbers", "text": null }
                                ]
                            }
                        ]
                    }
                }]
            }
        })
    }

    #[test]
    fn test_from_response_reads_board() {
        let board = RawBoard::from_response(sample_response()).unwrap();

        assert_eq!(
            board.columns,
            vec![
                ColumnDescriptor::new("numbers", "Deal Value ($)"),
                ColumnDescriptor::new("status", "Stage"),
            ]
        );
        assert_eq!(board.items.len(), 2);
        assert_eq!(board.items[0].name, "Acme renewal");
        assert_eq!(board.items[0].values["numbers"], "$1,200.50");
    }

    #[test]
    fn test_null_text_reads_as_empty() {
        let board = RawBoard::from_response(sample_response()).unwrap();
        assert_eq!(board.items[1].values["numbers"], "");
        assert!(!board.items[1].values.contains_key("status"));
    }

    #[test]
    fn test_error_list_is_upstream_error() {
        let body = json!({ "errors": [{ "message": "Not Authenticated" }] });
        let err = RawBoard::from_response(body).unwrap_err();
        assert_eq!(err.to_string(), "Upstream error: Monday API error: Not Authenticated");
    }

    #[test]
    fn test_error_message_field_is_upstream_error() {
        let body = json!({ "error_message": "Rate limit exceeded", "status_code": 429 });
        let err = RawBoard::from_response(body).unwrap_err();
        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[test]
    fn test_empty_board_list_is_not_found() {
        let body = json!({ "data": { "boards": [] } });
        let err = RawBoard::from_response(body).unwrap_err();
        assert!(err.to_string().contains("Board not found"));
    }

    #[test]
    fn test_malformed_payload() {
        let body = json!({ "data": { "boards": [{ "columns": "nope" }] } });
        let err = RawBoard::from_response(body).unwrap_err();
        assert!(err.to_string().contains("Malformed board response"));
    }

    #[test]
    fn test_empty_error_list_is_ignored() {
        let mut body = sample_response();
        body["errors"] = json!([]);
        assert!(RawBoard::from_response(body).is_ok());
    }
}
