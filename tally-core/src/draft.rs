//! Draft: the entry form a user fills in before a transaction exists.
//!
//! A draft starts blank (or from an existing record when editing), can be filled
//! field by field or from an interpreted free-text entry, and is validated only
//! when submitted. A failed submission leaves the draft untouched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{UnknownLabel, ValidationError};
use crate::model::{Category, MAX_AMOUNT, Status, Transaction, TransactionFields, TransactionType};
use crate::parsed::ParsedTransaction;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub description: String,
    pub amount: Option<Decimal>,
    pub kind: TransactionType,
    pub category: Category,
    pub status: Status,
    pub date: NaiveDate,
    pub counterparty: String,
    /// Only kept on submit when `status` is due
    pub due_date: Option<NaiveDate>,
    editing: Option<String>,
}

impl Draft {
    /// Blank form: an expense, category Other, paid, dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            description: String::new(),
            amount: None,
            kind: TransactionType::Expense,
            category: Category::default(),
            status: Status::default(),
            date: today,
            counterparty: String::new(),
            due_date: None,
            editing: None,
        }
    }

    /// Form pre-filled from an existing record; submitting replaces that record.
    pub fn from_transaction(t: &Transaction) -> Self {
        Self {
            description: t.description().to_string(),
            amount: Some(t.amount()),
            kind: t.kind(),
            category: t.category(),
            status: t.status(),
            date: t.date(),
            counterparty: t.counterparty().unwrap_or_default().to_string(),
            due_date: t.due_date(),
            editing: Some(t.id().to_string()),
        }
    }

    /// Id of the record being edited, if any.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Fill in fields from an interpretation. Unknown categories become Other and a
    /// missing counterparty leaves the current one alone.
    pub fn apply_parsed(&mut self, parsed: &ParsedTransaction) {
        self.description = parsed.description.clone();
        self.amount = Some(parsed.amount);
        self.kind = parsed.kind;
        self.category = parsed.category();
        if let Some(cp) = parsed.counterparty.as_deref().filter(|c| !c.trim().is_empty()) {
            self.counterparty = cp.to_string();
        }
    }

    /// Set one field from user input.
    pub fn set(&mut self, field: DraftField, value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        let invalid = || ValidationError::InvalidValue {
            field: field.as_str(),
            value: value.to_string(),
        };

        match field {
            DraftField::Description => self.description = value.to_string(),
            DraftField::Amount => {
                let cleaned = value.replace(',', "");
                self.amount = Some(Decimal::from_str(&cleaned).map_err(|_| invalid())?);
            }
            DraftField::Type => self.kind = value.parse().map_err(|_| invalid())?,
            DraftField::Category => self.category = value.parse().map_err(|_| invalid())?,
            DraftField::Status => self.status = value.parse().map_err(|_| invalid())?,
            DraftField::Date => {
                self.date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?
            }
            DraftField::Counterparty => self.counterparty = value.to_string(),
            DraftField::DueDate => {
                self.due_date = Some(NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?)
            }
        }
        Ok(())
    }

    /// Reset one field to its blank-form value. The date keeps its current value.
    pub fn clear(&mut self, field: DraftField) {
        match field {
            DraftField::Description => self.description.clear(),
            DraftField::Amount => self.amount = None,
            DraftField::Type => self.kind = TransactionType::Expense,
            DraftField::Category => self.category = Category::default(),
            DraftField::Status => self.status = Status::default(),
            DraftField::Date => {}
            DraftField::Counterparty => self.counterparty.clear(),
            DraftField::DueDate => self.due_date = None,
        }
    }

    /// Validate and build the record with a fresh UUID (or the edited record's id).
    pub fn submit(&self) -> Result<Transaction, ValidationError> {
        self.submit_with_id(|| Uuid::new_v4().to_string())
    }

    pub fn submit_with_id(&self, new_id: impl FnOnce() -> String) -> Result<Transaction, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let amount = self.amount.ok_or(ValidationError::MissingAmount)?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(amount));
        }

        let counterparty = Some(self.counterparty.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let due_date = match self.status {
            Status::Due => self.due_date,
            Status::Paid => None,
        };

        Transaction::new(TransactionFields {
            id: self.editing.clone().unwrap_or_else(new_id),
            date: self.date,
            description: description.to_string(),
            amount,
            kind: self.kind,
            category: self.category,
            status: self.status,
            counterparty,
            due_date,
        })
    }
}

/// Form fields a user can set by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Description,
    Amount,
    Type,
    Category,
    Status,
    Date,
    Counterparty,
    DueDate,
}

impl DraftField {
    pub const ALL: [DraftField; 8] = [
        DraftField::Description,
        DraftField::Amount,
        DraftField::Type,
        DraftField::Category,
        DraftField::Status,
        DraftField::Date,
        DraftField::Counterparty,
        DraftField::DueDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Description => "description",
            DraftField::Amount => "amount",
            DraftField::Type => "type",
            DraftField::Category => "category",
            DraftField::Status => "status",
            DraftField::Date => "date",
            DraftField::Counterparty => "counterparty",
            DraftField::DueDate => "due_date",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        let alias = match key.as_str() {
            "desc" => Some(DraftField::Description),
            "kind" => Some(DraftField::Type),
            "due" | "duedate" => Some(DraftField::DueDate),
            "client" | "vendor" | "payee" | "payer" => Some(DraftField::Counterparty),
            _ => None,
        };
        if let Some(f) = alias {
            return Ok(f);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(DraftField::as_str).collect();
                UnknownLabel::new("field", s.trim(), &names)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed::CategorySuggestion;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
    }

    fn filled() -> Draft {
        let mut d = Draft::new(today());
        d.description = "Electricity bill".to_string();
        d.amount = Some(dec!(84.20));
        d
    }

    #[test]
    fn test_blank_draft_defaults() {
        let d = Draft::new(today());
        assert_eq!(d.kind, TransactionType::Expense);
        assert_eq!(d.category, Category::Other);
        assert_eq!(d.status, Status::Paid);
        assert_eq!(d.date, today());
        assert!(!d.is_editing());
    }

    #[test]
    fn test_submit_rejects_missing_or_non_positive_amount() {
        let mut d = filled();
        d.amount = None;
        assert_eq!(d.submit(), Err(ValidationError::MissingAmount));

        d.amount = Some(dec!(0));
        assert_eq!(d.submit(), Err(ValidationError::NonPositiveAmount(dec!(0))));

        d.amount = Some(dec!(-1));
        assert!(d.submit().is_err());
    }

    fn huge() -> Decimal {
        Decimal::from_str("50000000000000000000000000000").unwrap()
    }

    #[test]
    fn test_submit_rejects_amount_above_limit() {
        let mut d = filled();
        d.set(DraftField::Amount, "50000000000000000000000000000").unwrap();
        assert_eq!(
            d.submit(),
            Err(ValidationError::AmountTooLarge(huge()))
        );

        d.amount = Some(MAX_AMOUNT);
        assert_eq!(d.submit().unwrap().amount(), MAX_AMOUNT);
    }

    #[test]
    fn test_submit_rejects_blank_description() {
        let mut d = filled();
        d.description = "   ".to_string();
        assert_eq!(d.submit(), Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn test_paid_submission_drops_due_date() {
        let mut d = filled();
        d.due_date = Some(today());
        let tx = d.submit_with_id(|| "id-1".to_string()).unwrap();
        assert_eq!(tx.due_date(), None);

        d.status = Status::Due;
        let tx = d.submit_with_id(|| "id-2".to_string()).unwrap();
        assert_eq!(tx.due_date(), Some(today()));
    }

    #[test]
    fn test_blank_counterparty_becomes_none() {
        let mut d = filled();
        d.counterparty = "  ".to_string();
        assert_eq!(d.submit().unwrap().counterparty(), None);

        d.counterparty = " City Power ".to_string();
        assert_eq!(d.submit().unwrap().counterparty(), Some("City Power"));
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let d = filled();
        let a = d.submit().unwrap();
        let b = d.submit().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_editing_keeps_id_and_replaces_all_fields() {
        let original = filled().submit_with_id(|| "keep-me".to_string()).unwrap();
        let mut d = Draft::from_transaction(&original);
        assert_eq!(d.editing_id(), Some("keep-me"));

        d.description = "Water bill".to_string();
        d.amount = Some(dec!(30));
        d.kind = TransactionType::Income;
        let edited = d.submit_with_id(|| unreachable!("editing must reuse the id")).unwrap();

        assert_eq!(edited.id(), "keep-me");
        assert_eq!(edited.description(), "Water bill");
        assert_eq!(edited.amount(), dec!(30));
        assert_eq!(edited.kind(), TransactionType::Income);
        assert_eq!(edited.date(), original.date());
    }

    #[test]
    fn test_apply_parsed_overwrites_and_defaults_category() {
        let mut d = Draft::new(today());
        d.counterparty = "Typed earlier".to_string();
        d.status = Status::Due;

        d.apply_parsed(&ParsedTransaction {
            description: "Design work".to_string(),
            amount: dec!(1000),
            kind: TransactionType::Income,
            category_suggestion: CategorySuggestion::Unknown("Design".to_string()),
            counterparty: None,
        });

        assert_eq!(d.description, "Design work");
        assert_eq!(d.amount, Some(dec!(1000)));
        assert_eq!(d.kind, TransactionType::Income);
        assert_eq!(d.category, Category::Other);
        // untouched by the interpreter
        assert_eq!(d.counterparty, "Typed earlier");
        assert_eq!(d.status, Status::Due);

        d.apply_parsed(&ParsedTransaction {
            description: "Design work".to_string(),
            amount: dec!(1000),
            kind: TransactionType::Income,
            category_suggestion: CategorySuggestion::Known(Category::ClientWork),
            counterparty: Some("John".to_string()),
        });
        assert_eq!(d.category, Category::ClientWork);
        assert_eq!(d.counterparty, "John");
    }

    #[test]
    fn test_set_parses_field_values() {
        let mut d = Draft::new(today());
        d.set(DraftField::Amount, "1,250.50").unwrap();
        d.set("type".parse().unwrap(), "Income").unwrap();
        d.set("category".parse().unwrap(), "client work").unwrap();
        d.set("due".parse().unwrap(), "2025-08-01").unwrap();

        assert_eq!(d.amount, Some(dec!(1250.50)));
        assert_eq!(d.kind, TransactionType::Income);
        assert_eq!(d.category, Category::ClientWork);
        assert_eq!(d.due_date, NaiveDate::from_ymd_opt(2025, 8, 1));

        let err = d.set(DraftField::Date, "14/07/2025").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: "date",
                value: "14/07/2025".to_string()
            }
        );
        assert_eq!(d.date, today());
    }
}
