//! Flattening of column-keyed board items into title-keyed rows.

use crate::source::RawBoard;

/// Title given to the column holding each item's name.
pub const ITEM_NAME_COLUMN: &str = "Item Name";

/// Rows of raw cell text under unsanitized column titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    /// `Item Name` followed by one title per column descriptor.
    pub titles: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flattens a board into one row per item.
///
/// Every row carries every descriptor column; values an item does not
/// populate are filled with empty text.
pub fn flatten(board: &RawBoard) -> FlatTable {
    let titles = std::iter::once(ITEM_NAME_COLUMN.to_string())
        .chain(board.columns.iter().map(|c| c.title.clone()))
        .collect();

    let rows = board
        .items
        .iter()
        .map(|item| {
            std::iter::once(item.name.clone())
                .chain(
                    board
                        .columns
                        .iter()
                        .map(|c| item.values.get(&c.id).cloned().unwrap_or_default()),
                )
                .collect()
        })
        .collect();

    FlatTable { titles, rows }
}
