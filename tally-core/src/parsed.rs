//! Structured fields recovered from a free-text entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Category, TransactionType};

/// What the interpreter suggested for the category.
///
/// Unknown suggestions are kept for display but never stored on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategorySuggestion {
    Known(Category),
    Unknown(String),
}

impl CategorySuggestion {
    pub fn from_label(label: &str) -> Self {
        match Category::from_label(label) {
            Some(c) => CategorySuggestion::Known(c),
            None => CategorySuggestion::Unknown(label.trim().to_string()),
        }
    }

    /// The suggested category, or [`Category::Other`] when it is not one we know.
    pub fn category_or_default(&self) -> Category {
        match self {
            CategorySuggestion::Known(c) => *c,
            CategorySuggestion::Unknown(_) => Category::default(),
        }
    }
}

/// A successful interpretation. The amount may be zero; the draft rejects it on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_suggestion: CategorySuggestion,
    pub counterparty: Option<String>,
}

impl ParsedTransaction {
    pub fn category(&self) -> Category {
        self.category_suggestion.category_or_default()
    }
}
