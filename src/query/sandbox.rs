//! Plan interpreter.
//!
//! Runs a [`Plan`] against a namespace that starts with exactly the two synced
//! tables. The step set is closed, so every failure is one of the
//! [`ExecError`] variants rather than an arbitrary exception.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::ir::{AggregateFunc, AggregateSpec, Comparison, Plan, Statement, Step, RESULT_BINDING};
use crate::error::AnalystError;
use crate::session::{SourceKind, TableSet};
use crate::table::{Column, ColumnKind, Row, Table, Value};

/// Rendering of a plan that never bound its result.
pub const NO_RESULT: &str = "No result returned";

/// Maximum rows (or sequence items) included when a result is rendered as text.
pub const RENDER_ROW_LIMIT: usize = 20;

/// The value a plan bound to its result name.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(Value),
    Table(Table),
    Sequence(Vec<Value>),
    /// The plan finished without binding a result.
    NoResult,
}

impl QueryResult {
    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult)
    }

    /// Renders the result as text for narration and display.
    pub fn render(&self) -> String {
        match self {
            Self::Scalar(value) => value.to_display_string(),
            Self::Table(table) => table.render(RENDER_ROW_LIMIT),
            Self::Sequence(values) => {
                let shown = values
                    .iter()
                    .take(RENDER_ROW_LIMIT)
                    .map(Value::to_display_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if values.len() > RENDER_ROW_LIMIT {
                    format!("[{shown}, ... ({} more)]", values.len() - RENDER_ROW_LIMIT)
                } else {
                    format!("[{shown}]")
                }
            }
            Self::NoResult => NO_RESULT.to_string(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Ways a plan can fail while running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecError {
    #[error("name '{0}' is not defined")]
    UnknownBinding(String),

    #[error("column '{column}' not found in '{binding}' (available: {available})")]
    UnknownColumn {
        binding: String,
        column: String,
        available: String,
    },

    #[error("cannot compute {func} of column '{column}': non-numeric value {sample:?}")]
    NotNumeric {
        func: &'static str,
        column: String,
        sample: String,
    },

    #[error("'{op}' needs a table, but '{binding}' holds a {kind}")]
    NotATable {
        op: &'static str,
        binding: String,
        kind: &'static str,
    },

    #[error("'{func}' needs a column")]
    MissingColumn { func: &'static str },

    #[error("filter '{cmp}' cannot use value {value}")]
    InvalidOperand { cmp: String, value: String },
}

impl From<ExecError> for AnalystError {
    fn from(err: ExecError) -> Self {
        AnalystError::execution(err.to_string())
    }
}

type ExecResult<T> = std::result::Result<T, ExecError>;

/// A value bound in the namespace.
#[derive(Debug, Clone)]
enum Binding {
    Table(Arc<Table>),
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl Binding {
    fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
        }
    }

    fn into_result(self) -> QueryResult {
        match self {
            Self::Table(table) => {
                QueryResult::Table(Arc::try_unwrap(table).unwrap_or_else(|t| (*t).clone()))
            }
            Self::Scalar(value) => QueryResult::Scalar(value),
            Self::Sequence(values) => QueryResult::Sequence(values),
        }
    }
}

/// Execution namespace for one plan.
pub struct Sandbox {
    namespace: HashMap<String, Binding>,
}

impl Sandbox {
    /// Creates a namespace holding exactly the deals and work-order tables.
    pub fn new(tables: &TableSet<'_>) -> Self {
        let namespace = SourceKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.binding_name().to_string(),
                    Binding::Table(Arc::clone(tables.get(*kind))),
                )
            })
            .collect();
        Self { namespace }
    }

    /// Names currently bound, sorted.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.namespace.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs every statement in order and reads the result binding.
    pub fn run(mut self, plan: &Plan) -> ExecResult<QueryResult> {
        for statement in &plan.statements {
            let value = self.eval(statement)?;
            self.namespace.insert(statement.bind.clone(), value);
        }

        Ok(self
            .namespace
            .remove(RESULT_BINDING)
            .map(Binding::into_result)
            .unwrap_or(QueryResult::NoResult))
    }

    fn lookup(&self, name: &str) -> ExecResult<&Binding> {
        self.namespace
            .get(name)
            .ok_or_else(|| ExecError::UnknownBinding(name.to_string()))
    }

    fn eval(&self, statement: &Statement) -> ExecResult<Binding> {
        let mut value = self.lookup(&statement.from)?.clone();
        for step in &statement.steps {
            value = self.apply(value, step, &statement.from)?;
        }
        Ok(value)
    }

    fn apply(&self, value: Binding, step: &Step, binding: &str) -> ExecResult<Binding> {
        let table = match value {
            Binding::Table(table) => table,
            Binding::Sequence(values) => return apply_to_sequence(values, step, binding),
            Binding::Scalar(_) => {
                return Err(ExecError::NotATable {
                    op: step.name(),
                    binding: binding.to_string(),
                    kind: "scalar",
                })
            }
        };

        let next = match step {
            Step::Filter { column, cmp, value } => {
                Binding::Table(Arc::new(filter(&table, binding, column, *cmp, value)?))
            }
            Step::Select { columns } => Binding::Table(Arc::new(select(&table, binding, columns)?)),
            Step::Sort { by, descending } => {
                Binding::Table(Arc::new(sort(&table, binding, by, *descending)?))
            }
            Step::Limit { count } => {
                let (columns, mut rows) = (*table).clone().into_parts();
                rows.truncate(*count);
                Binding::Table(Arc::new(Table::with_rows(columns, rows)))
            }
            Step::Join {
                with,
                left_on,
                right_on,
            } => {
                let right = match self.lookup(with)? {
                    Binding::Table(right) => right,
                    other => {
                        return Err(ExecError::NotATable {
                            op: "join",
                            binding: with.clone(),
                            kind: other.kind(),
                        })
                    }
                };
                Binding::Table(Arc::new(join(
                    &table, right, binding, with, left_on, right_on,
                )?))
            }
            Step::GroupBy { keys, aggregates } => {
                Binding::Table(Arc::new(group_by(&table, binding, keys, aggregates)?))
            }
            Step::Aggregate { func, column } => match column {
                Some(column) => {
                    let idx = column_index(&table, binding, column)?;
                    Binding::Scalar(aggregate(
                        table.rows().iter().map(|r| &r[idx]),
                        *func,
                        column,
                    )?)
                }
                None if *func == AggregateFunc::Count => {
                    Binding::Scalar(Value::Int(table.row_count() as i64))
                }
                None => return Err(ExecError::MissingColumn { func: func.as_str() }),
            },
            Step::Distinct { column } => {
                let idx = column_index(&table, binding, column)?;
                Binding::Sequence(distinct(table.rows().iter().map(|r| &r[idx])))
            }
            Step::Column { name } => {
                let idx = column_index(&table, binding, name)?;
                Binding::Sequence(table.rows().iter().map(|r| r[idx].clone()).collect())
            }
        };
        Ok(next)
    }
}

fn apply_to_sequence(mut values: Vec<Value>, step: &Step, binding: &str) -> ExecResult<Binding> {
    match step {
        Step::Limit { count } => {
            values.truncate(*count);
            Ok(Binding::Sequence(values))
        }
        Step::Sort { descending, .. } => {
            values.sort_by(|a, b| order(a, b, *descending));
            Ok(Binding::Sequence(values))
        }
        Step::Distinct { .. } => Ok(Binding::Sequence(distinct(values.iter()))),
        Step::Aggregate { func, .. } => {
            Ok(Binding::Scalar(aggregate(values.iter(), *func, binding)?))
        }
        other => Err(ExecError::NotATable {
            op: other.name(),
            binding: binding.to_string(),
            kind: "sequence",
        }),
    }
}

/// Finds a column by exact title, falling back to a unique case-insensitive match.
fn column_index(table: &Table, binding: &str, column: &str) -> ExecResult<usize> {
    if let Some(idx) = table.column_index(column) {
        return Ok(idx);
    }

    let wanted = column.trim().to_lowercase();
    let mut matches = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name.to_lowercase() == wanted);
    match (matches.next(), matches.next()) {
        (Some((idx, _)), None) => Ok(idx),
        _ => Err(ExecError::UnknownColumn {
            binding: binding.to_string(),
            column: column.to_string(),
            available: table.column_names().join(", "),
        }),
    }
}

/// Row predicate compiled from a filter step.
enum Predicate {
    Contains(String),
    NotContains(String),
    Equals { text: String, number: Option<f64> },
    NotEquals { text: String, number: Option<f64> },
    Compare(Comparison, f64),
    IsEmpty,
    NotEmpty,
}

impl Predicate {
    fn compile(cmp: Comparison, operand: &serde_json::Value) -> ExecResult<Self> {
        let text = match operand {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        let number = match operand {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        let invalid = || ExecError::InvalidOperand {
            cmp: format!("{cmp:?}").to_lowercase(),
            value: operand.to_string(),
        };

        Ok(match cmp {
            Comparison::IsEmpty => Self::IsEmpty,
            Comparison::NotEmpty => Self::NotEmpty,
            Comparison::Contains => Self::Contains(text.ok_or_else(invalid)?.to_lowercase()),
            Comparison::NotContains => {
                Self::NotContains(text.ok_or_else(invalid)?.to_lowercase())
            }
            Comparison::Equals => Self::Equals {
                text: text.ok_or_else(invalid)?.trim().to_lowercase(),
                number,
            },
            Comparison::NotEquals => Self::NotEquals {
                text: text.ok_or_else(invalid)?.trim().to_lowercase(),
                number,
            },
            Comparison::Gt | Comparison::Gte | Comparison::Lt | Comparison::Lte => {
                Self::Compare(cmp, number.ok_or_else(invalid)?)
            }
        })
    }

    fn matches(&self, cell: &Value) -> bool {
        let haystack = || match cell {
            Value::Null => String::new(),
            other => other.to_display_string().to_lowercase(),
        };
        let equals = |text: &str, number: Option<f64>| match (cell.as_f64(), number) {
            (Some(a), Some(b)) => a == b,
            _ => cell.match_key() == text,
        };

        match self {
            Self::Contains(needle) => haystack().contains(needle.as_str()),
            Self::NotContains(needle) => !haystack().contains(needle.as_str()),
            Self::Equals { text, number } => equals(text, *number),
            Self::NotEquals { text, number } => !equals(text, *number),
            Self::Compare(cmp, bound) => match cell.to_f64_lossy() {
                Some(v) => match cmp {
                    Comparison::Gt => v > *bound,
                    Comparison::Gte => v >= *bound,
                    Comparison::Lt => v < *bound,
                    _ => v <= *bound,
                },
                None => false,
            },
            Self::IsEmpty => cell.is_empty(),
            Self::NotEmpty => !cell.is_empty(),
        }
    }
}

fn filter(
    table: &Table,
    binding: &str,
    column: &str,
    cmp: Comparison,
    operand: &serde_json::Value,
) -> ExecResult<Table> {
    let idx = column_index(table, binding, column)?;
    let predicate = Predicate::compile(cmp, operand)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| predicate.matches(&row[idx]))
        .cloned()
        .collect();
    Ok(Table::with_rows(table.columns().to_vec(), rows))
}

fn select(table: &Table, binding: &str, columns: &[String]) -> ExecResult<Table> {
    let indices = columns
        .iter()
        .map(|c| column_index(table, binding, c))
        .collect::<ExecResult<Vec<_>>>()?;

    let out_columns = indices.iter().map(|&i| table.columns()[i].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(Table::with_rows(out_columns, rows))
}

/// NULLs sort last in both directions.
fn order(a: &Value, b: &Value, descending: bool) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.is_null(), b.is_null()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ if descending => b.sort_cmp(a),
        _ => a.sort_cmp(b),
    }
}

fn sort(table: &Table, binding: &str, by: &str, descending: bool) -> ExecResult<Table> {
    let idx = column_index(table, binding, by)?;
    let (columns, mut rows) = table.clone().into_parts();
    rows.sort_by(|a, b| order(&a[idx], &b[idx], descending));
    Ok(Table::with_rows(columns, rows))
}

fn join(
    left: &Table,
    right: &Table,
    left_binding: &str,
    right_binding: &str,
    left_on: &str,
    right_on: &str,
) -> ExecResult<Table> {
    let li = column_index(left, left_binding, left_on)?;
    let ri = column_index(right, right_binding, right_on)?;

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, row) in right.rows().iter().enumerate() {
        if !row[ri].is_empty() {
            index.entry(row[ri].match_key()).or_default().push(pos);
        }
    }

    let mut names: HashSet<String> = left.columns().iter().map(|c| c.name.clone()).collect();
    let mut columns = left.columns().to_vec();
    for (pos, column) in right.columns().iter().enumerate() {
        if pos == ri {
            continue;
        }
        let mut name = column.name.clone();
        if names.contains(&name) {
            name = format!("{} ({})", column.name, right_binding);
        }
        names.insert(name.clone());
        columns.push(Column::new(name, column.kind));
    }

    let mut rows = Vec::new();
    for left_row in left.rows() {
        if left_row[li].is_empty() {
            continue;
        }
        let Some(matches) = index.get(&left_row[li].match_key()) else {
            continue;
        };
        for &pos in matches {
            let mut row = left_row.clone();
            row.extend(
                right.rows()[pos]
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != ri)
                    .map(|(_, v)| v.clone()),
            );
            rows.push(row);
        }
    }

    Ok(Table::with_rows(columns, rows))
}

fn group_by(
    table: &Table,
    binding: &str,
    keys: &[String],
    aggregates: &[AggregateSpec],
) -> ExecResult<Table> {
    let key_indices = keys
        .iter()
        .map(|k| column_index(table, binding, k))
        .collect::<ExecResult<Vec<_>>>()?;
    let agg_indices = aggregates
        .iter()
        .map(|spec| match &spec.column {
            Some(column) => column_index(table, binding, column).map(Some),
            None if spec.func == AggregateFunc::Count => Ok(None),
            None => Err(ExecError::MissingColumn {
                func: spec.func.as_str(),
            }),
        })
        .collect::<ExecResult<Vec<_>>>()?;

    // Groups in first-seen order, then sorted by key.
    let mut groups: Vec<(Row, Vec<usize>)> = Vec::new();
    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();
    for (pos, row) in table.rows().iter().enumerate() {
        let key: Vec<String> = key_indices.iter().map(|&i| row[i].exact_key()).collect();
        let slot = *lookup.entry(key).or_insert_with(|| {
            groups.push((key_indices.iter().map(|&i| row[i].clone()).collect(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(pos);
    }
    groups.sort_by(|(a, _), (b, _)| {
        a.iter()
            .zip(b)
            .map(|(x, y)| order(x, y, false))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut columns: Vec<Column> = key_indices
        .iter()
        .map(|&i| table.columns()[i].clone())
        .collect();
    for (spec, idx) in aggregates.iter().zip(&agg_indices) {
        let kind = match (spec.func, idx) {
            (AggregateFunc::Min | AggregateFunc::Max, Some(i)) => table.columns()[*i].kind,
            _ => ColumnKind::Numeric,
        };
        columns.push(Column::new(spec.output_name(), kind));
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (key_values, members) in groups {
        let mut row = key_values;
        for (spec, idx) in aggregates.iter().zip(&agg_indices) {
            let value = match idx {
                Some(i) => aggregate(
                    members.iter().map(|&pos| &table.rows()[pos][*i]),
                    spec.func,
                    &table.columns()[*i].name,
                )?,
                None => Value::Int(members.len() as i64),
            };
            row.push(value);
        }
        rows.push(row);
    }

    Ok(Table::with_rows(columns, rows))
}

fn distinct<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(v.exact_key()))
        .cloned()
        .collect()
}

/// Reduces values to one scalar. NULLs and blank text are skipped.
fn aggregate<'a>(
    values: impl Iterator<Item = &'a Value>,
    func: AggregateFunc,
    column: &str,
) -> ExecResult<Value> {
    let present: Vec<&Value> = values.filter(|v| !v.is_empty()).collect();

    match func {
        AggregateFunc::Count => Ok(Value::Int(present.len() as i64)),
        AggregateFunc::CountDistinct => {
            let keys: HashSet<String> = present.iter().map(|v| v.exact_key()).collect();
            Ok(Value::Int(keys.len() as i64))
        }
        AggregateFunc::Sum => {
            let numbers = numeric(&present, func, column)?;
            if !present.is_empty() && present.iter().all(|v| matches!(v, Value::Int(_))) {
                let total = present
                    .iter()
                    .filter_map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .sum();
                return Ok(Value::Int(total));
            }
            Ok(Value::Float(numbers.iter().sum()))
        }
        AggregateFunc::Mean => {
            let numbers = numeric(&present, func, column)?;
            if numbers.is_empty() {
                return Ok(Value::Null);
            }
            Ok(Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64))
        }
        AggregateFunc::Min | AggregateFunc::Max => {
            let all_text = present.iter().all(|v| matches!(v, Value::Text(_)));
            if !all_text {
                numeric(&present, func, column)?;
            }
            let picked = present.into_iter().reduce(|best, v| {
                let ord = v.sort_cmp(best);
                let better = if func == AggregateFunc::Min {
                    ord.is_lt()
                } else {
                    ord.is_gt()
                };
                if better {
                    v
                } else {
                    best
                }
            });
            Ok(picked.cloned().unwrap_or(Value::Null))
        }
    }
}

fn numeric(values: &[&Value], func: AggregateFunc, column: &str) -> ExecResult<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| ExecError::NotNumeric {
                func: func.as_str(),
                column: column.to_string(),
                sample: v.to_display_string(),
            })
        })
        .collect()
}
