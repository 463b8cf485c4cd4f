//! Canonical table types.
//!
//! Defines the typed tabular form every board is normalized into, and the
//! values it holds.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Whether a column holds numeric amounts or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Metadata about a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column title, unique within its table.
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    /// Creates a new column with the given title and kind.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Numeric)
    }
}

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value (only produced by computations, never by normalization).
    #[default]
    Null,

    /// Whole number, e.g. a count.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    Text(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for NULL and blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Int(_) | Value::Float(_) => false,
        }
    }

    /// Returns the numeric value for Int and Float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Null | Value::Text(_) => None,
        }
    }

    /// Returns the numeric value, also reading text that spells a number.
    pub fn to_f64_lossy(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }

    /// Converts the value to its display string.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Normalized key used for loose matching (joins, equality filters).
    pub fn match_key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.trim().to_lowercase(),
        }
    }

    /// Case-sensitive key used for grouping and distinct values.
    ///
    /// Numbers compare by value, so `Int(3)` and `Float(3.0)` share a key;
    /// text never collides with a number or NULL.
    pub fn exact_key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Int(i) => format!("n:{i}"),
            Value::Float(f) => format!("n:{f}"),
            Value::Text(s) => format!("t:{s}"),
        }
    }

    /// Total ordering for sorting: numbers, then text, then NULL.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Int(_) | Value::Float(_) => 0,
                Value::Text(_) => 1,
                Value::Null => 2,
            }
        }

        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => match (self, other) {
                (Value::Text(a), Value::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A row of values, aligned with the table's columns.
pub type Row = Vec<Value>;

/// An ordered sequence of rows under uniquely titled columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table with the given columns and rows.
    ///
    /// Every row must have one value per column.
    pub fn with_rows(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the table, returning its columns and rows.
    pub fn into_parts(self) -> (Vec<Column>, Vec<Row>) {
        (self.columns, self.rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column titles in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the position of the column with the given title.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the column with the given title.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the value at `row` under the column titled `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Returns the shape of the table, as shown to the planner.
    pub fn shape(&self, name: impl Into<String>) -> TableShape {
        TableShape {
            name: name.into(),
            columns: self.column_names(),
            row_count: self.row_count(),
        }
    }

    /// Renders the table as text, showing at most `max_rows` rows.
    pub fn render(&self, max_rows: usize) -> String {
        let mut out = self.column_names().join(" | ");
        for row in self.rows.iter().take(max_rows) {
            out.push('\n');
            out.push_str(
                &row.iter()
                    .map(Value::to_display_string)
                    .collect::<Vec<_>>()
                    .join(" | "),
            );
        }
        if self.rows.len() > max_rows {
            out.push_str(&format!("\n... ({} more rows)", self.rows.len() - max_rows));
        }
        out
    }
}

/// Column titles and row count of a table, without its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    /// Binding name the table is reachable under.
    pub name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}
