//! Prompt construction for LLM requests.
//!
//! The planner sees only table shapes (titles and row counts), never row
//! contents. The narrator sees the question and the rendered result.

use crate::llm::types::Message;
use crate::table::TableShape;

/// System prompt describing the plan format.
const PLAN_SYSTEM_PROMPT: &str = r#"You are a data analyst. You answer business questions by writing a plan of table operations as JSON.

PLAN FORMAT:
{"statements": [{"bind": "<name>", "from": "<name>", "steps": [<step>, ...]}, ...]}

Statements run in order. Each one starts from a bound name, applies its steps, and binds the outcome under "bind".
The final answer MUST be bound to "result".

STEPS:
- {"op": "filter", "column": C, "cmp": CMP, "value": V}
  CMP is one of: contains, not_contains, equals, not_equals, gt, gte, lt, lte, is_empty, not_empty
- {"op": "select", "columns": [C, ...]}
- {"op": "sort", "by": C, "descending": true|false}
- {"op": "limit", "count": N}
- {"op": "join", "with": NAME, "left_on": C, "right_on": C}
- {"op": "group_by", "keys": [C, ...], "aggregates": [{"func": F, "column": C, "as": TITLE}, ...]}
- {"op": "aggregate", "func": F, "column": C}
  F is one of: sum, mean, min, max, count, count_distinct
- {"op": "distinct", "column": C}
- {"op": "column", "name": C}

INSTRUCTIONS:
- Use only the tables and column titles listed by the user, spelled exactly.
- For text matching use "contains"; it ignores case.
- Return ONLY the JSON plan, no explanations."#;

/// Closing line of the narration prompt.
pub const NARRATION_INSTRUCTION: &str = "Write a professional 1-sentence executive summary.";

/// Formats table shapes as a numbered list.
pub fn format_shapes(shapes: &[TableShape]) -> String {
    shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            format!(
                "{}. {} ({} rows): [{}]",
                i + 1,
                shape.name,
                shape.row_count,
                shape.columns.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the messages asking for a plan that answers `question`.
pub fn build_plan_messages(question: &str, shapes: &[TableShape]) -> Vec<Message> {
    vec![
        Message::system(PLAN_SYSTEM_PROMPT),
        Message::user(format!(
            "User Query: \"{}\"\nTables:\n{}",
            question,
            format_shapes(shapes)
        )),
    ]
}

/// Builds the message asking for a one-sentence summary of `result`.
pub fn build_narration_messages(question: &str, result: &str) -> Vec<Message> {
    vec![Message::user(format!(
        "User asked: \"{question}\"\nResult: {result}\n{NARRATION_INSTRUCTION}"
    ))]
}
