//! Canonical tables and the normalization pipeline that produces them.

mod classify;
mod flatten;
mod pipeline;
mod types;

pub use classify::{
    coerce_amount, sanitize_title, ColumnClassifier, KeywordClassifier, AMOUNT_CEILING,
    EXCLUDE_KEYWORDS, MONEY_KEYWORDS,
};
pub use flatten::{flatten, FlatTable, ITEM_NAME_COLUMN};
pub use pipeline::{normalize, Pipeline, SyncOutcome};
pub use types::{Column, ColumnKind, Row, Table, TableShape, Value};
