//! Column classification and cell coercion.
//!
//! Decides from a column's title alone whether it holds money-like amounts,
//! and cleans titles and amount cells accordingly.

use regex::Regex;
use std::sync::OnceLock;

use super::ColumnKind;

/// Title keywords that mark a column as holding amounts.
pub const MONEY_KEYWORDS: [&str; 6] = ["value", "amount", "revenue", "budget", "cost", "price"];

/// Title keywords that veto the amount classification.
pub const EXCLUDE_KEYWORDS: [&str; 8] = [
    "status",
    "stage",
    "date",
    "id",
    "code",
    "name",
    "probability",
    "sector",
];

/// Parsed amounts above this are treated as misfiled data and zeroed.
pub const AMOUNT_CEILING: f64 = 1_000_000_000_000.0;

/// Strategy deciding a column's kind from its title.
///
/// Implementations must be pure: the same title always yields the same kind.
pub trait ColumnClassifier: Send + Sync {
    fn classify(&self, title: &str) -> ColumnKind;
}

/// Keyword heuristic over the lower-cased title.
///
/// A column is numeric iff its title contains at least one money keyword and
/// no exclude keyword. Matching is by substring.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl ColumnClassifier for KeywordClassifier {
    fn classify(&self, title: &str) -> ColumnKind {
        let lower = title.to_lowercase();
        let is_money = MONEY_KEYWORDS.iter().any(|k| lower.contains(k));
        let is_excluded = EXCLUDE_KEYWORDS.iter().any(|k| lower.contains(k));

        if is_money && !is_excluded {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Replaces every non-word, non-whitespace character with a space, then trims.
pub fn sanitize_title(title: &str) -> String {
    punctuation().replace_all(title, " ").trim().to_string()
}

/// Reads an amount cell.
///
/// Keeps only digits and decimal points, parses the rest, and falls back to 0.
/// Values above [`AMOUNT_CEILING`] become 0.
pub fn coerce_amount(text: &str) -> f64 {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let amount = digits.parse::<f64>().unwrap_or(0.0);
    if amount > AMOUNT_CEILING {
        0.0
    } else {
        amount
    }
}
