//! Operator descriptors for AppliesTo expressions.

use serde::Deserialize;

/// Operator grouping shown in hover and completion details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorCategory {
    Comparison,
    Logical,
    Grouping,
}

impl OperatorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorCategory::Comparison => "comparison",
            OperatorCategory::Logical => "logical",
            OperatorCategory::Grouping => "grouping",
        }
    }
}

/// A comparison, logical, or grouping operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperatorDescriptor {
    /// Canonical spelling (e.g., "&&")
    pub symbol: String,
    /// Equivalent spellings (e.g., "and")
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub example: Option<String>,
    pub category: OperatorCategory,
}

impl OperatorDescriptor {
    /// Single-character operators are never offered as completions.
    pub fn is_single_char(&self) -> bool {
        self.symbol.chars().count() == 1
    }

    /// Whether the symbol or any alternative starts with `prefix`.
    ///
    /// `prefix` must already be lower-cased.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.symbol.to_lowercase().starts_with(prefix)
            || self
                .alternatives
                .iter()
                .any(|alt| alt.to_lowercase().starts_with(prefix))
    }

    /// Spelling to insert for a typed word.
    ///
    /// The symbol wins when it matches; otherwise the first matching alternative
    /// is used so that typing `an` completes to `and` rather than `&&`.
    pub fn spelling_for(&self, typed: &str) -> &str {
        let typed = typed.to_lowercase();
        if typed.is_empty() || self.symbol.to_lowercase().starts_with(&typed) {
            return &self.symbol;
        }
        self.alternatives
            .iter()
            .find(|alt| alt.to_lowercase().starts_with(&typed))
            .map(String::as_str)
            .unwrap_or(&self.symbol)
    }

    /// Whether `text` is the symbol or one of its alternatives.
    pub fn is_spelled(&self, text: &str) -> bool {
        self.symbol == text
            || self
                .alternatives
                .iter()
                .any(|alt| alt.eq_ignore_ascii_case(text))
    }
}
