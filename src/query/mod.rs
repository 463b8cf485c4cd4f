//! Natural-language questions over the synced tables.
//!
//! The planner asks the model for a [`Plan`], the [`Sandbox`] runs it against
//! the tables, and the narrator summarizes the result. [`QueryEngine`] drives
//! the three steps.

pub mod engine;
pub mod ir;
pub mod narrator;
pub mod planner;
pub mod sandbox;

pub use engine::{Answer, EngineState, QueryEngine, QueryRequest, AGENT_ERROR_PREFIX};
pub use ir::{AggregateFunc, AggregateSpec, Comparison, Plan, Statement, Step, RESULT_BINDING};
pub use narrator::Narrator;
pub use planner::Planner;
pub use sandbox::{ExecError, QueryResult, Sandbox, NO_RESULT, RENDER_ROW_LIMIT};
