//! Error types shared across the core crate.

use rust_decimal::Decimal;
use thiserror::Error;

/// A record (or draft) failed validation at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter an amount")]
    MissingAmount,

    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),

    #[error("amount is too large (got {0})")]
    AmountTooLarge(Decimal),

    #[error("a due date is only allowed on entries with status 'due'")]
    DueDateWithoutDueStatus,

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// A label did not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl UnknownLabel {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no transaction with id '{0}'")]
    NotFound(String),

    #[error("a transaction with id '{0}' already exists")]
    DuplicateId(String),

    #[error("id prefix '{prefix}' matches {count} transactions")]
    Ambiguous { prefix: String, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("already interpreting a previous entry, please wait")]
    Busy,

    #[error("no interpretation is in flight")]
    NotInterpreting,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
