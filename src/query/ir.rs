//! Plan representation for generated snippets.
//!
//! A plan is a list of statements; each starts from a bound name, applies a
//! pipeline of closed-set steps, and binds the outcome under a new name. The
//! answer is whatever ends up bound to [`RESULT_BINDING`].

use serde::{Deserialize, Serialize};

use crate::error::{AnalystError, Result};

/// Name the plan binds its final answer to.
pub const RESULT_BINDING: &str = "result";

/// A parsed snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Plan {
    /// Parses a snippet (already stripped of code fences) into a plan.
    pub fn parse(snippet: &str) -> Result<Self> {
        serde_json::from_str(snippet)
            .map_err(|e| AnalystError::plan(format!("Could not read generated plan: {e}")))
    }

    /// Returns true if some statement binds the result name.
    pub fn binds_result(&self) -> bool {
        self.statements.iter().any(|s| s.bind == RESULT_BINDING)
    }
}

/// `bind = from |> steps...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub bind: String,
    pub from: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One tabular operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Keep rows whose `column` satisfies `cmp` against `value`.
    Filter {
        column: String,
        cmp: Comparison,
        #[serde(default)]
        value: serde_json::Value,
    },
    /// Keep only the listed columns, in the listed order.
    Select { columns: Vec<String> },
    /// Stable sort by one column.
    Sort {
        by: String,
        #[serde(default)]
        descending: bool,
    },
    /// Keep the first `count` rows (or sequence items).
    Limit { count: usize },
    /// Inner join with another binding on equal keys.
    Join {
        with: String,
        left_on: String,
        right_on: String,
    },
    /// Group rows by key columns and compute one aggregate per output column.
    GroupBy {
        keys: Vec<String>,
        aggregates: Vec<AggregateSpec>,
    },
    /// Reduce to a single scalar.
    Aggregate {
        func: AggregateFunc,
        #[serde(default)]
        column: Option<String>,
    },
    /// Unique values of a column, in first-seen order.
    Distinct { column: String },
    /// All values of a column.
    Column { name: String },
}

impl Step {
    /// Operation name as written in the snippet.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter { .. } => "filter",
            Self::Select { .. } => "select",
            Self::Sort { .. } => "sort",
            Self::Limit { .. } => "limit",
            Self::Join { .. } => "join",
            Self::GroupBy { .. } => "group_by",
            Self::Aggregate { .. } => "aggregate",
            Self::Distinct { .. } => "distinct",
            Self::Column { .. } => "column",
        }
    }
}

/// Row predicate used by `filter`. Text comparisons ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    Gt,
    Gte,
    Lt,
    Lte,
    IsEmpty,
    NotEmpty,
}

/// Reduction applied by `aggregate` and `group_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunc {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    CountDistinct,
}

impl AggregateFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
        }
    }
}

/// One aggregate column of a `group_by`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub func: AggregateFunc,
    #[serde(default)]
    pub column: Option<String>,
    /// Output column title; defaults to `<func>_<column>` or `count`.
    #[serde(default, rename = "as")]
    pub alias: Option<String>,
}

impl AggregateSpec {
    /// Title of the output column.
    pub fn output_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.column {
            Some(column) => format!("{}_{}", self.func.as_str(), column),
            None => self.func.as_str().to_string(),
        }
    }
}
