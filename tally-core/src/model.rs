//! Transaction record types and the labels that classify them

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{UnknownLabel, ValidationError};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLabel::new("type", s, &["income", "expense"]))
    }
}

/// Settlement state of an entry. `Due` means owed but not yet settled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Paid,
    Due,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Paid, Status::Due];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Paid => "paid",
            Status::Due => "due",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLabel::new("status", s, &["paid", "due"]))
    }
}

/// The fixed set of categories an entry can be filed under
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Salary")]
    Salary,
    #[serde(rename = "Freelance Project")]
    FreelanceProject,
    #[serde(rename = "Client Work")]
    ClientWork,
    #[serde(rename = "Side Hustle")]
    SideHustle,
    #[serde(rename = "Investment")]
    Investment,
    #[serde(rename = "Gifts Received")]
    GiftsReceived,
    #[serde(rename = "Rent")]
    Rent,
    #[serde(rename = "Groceries")]
    Groceries,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Software/Tools")]
    SoftwareTools,
    #[serde(rename = "Loan Payment")]
    LoanPayment,
    #[serde(rename = "Taxes")]
    Taxes,
    #[serde(rename = "Other")]
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::Salary,
        Category::FreelanceProject,
        Category::ClientWork,
        Category::SideHustle,
        Category::Investment,
        Category::GiftsReceived,
        Category::Rent,
        Category::Groceries,
        Category::Utilities,
        Category::Transportation,
        Category::Healthcare,
        Category::Education,
        Category::Entertainment,
        Category::SoftwareTools,
        Category::LoanPayment,
        Category::Taxes,
        Category::Other,
    ];

    /// Display name, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::FreelanceProject => "Freelance Project",
            Category::ClientWork => "Client Work",
            Category::SideHustle => "Side Hustle",
            Category::Investment => "Investment",
            Category::GiftsReceived => "Gifts Received",
            Category::Rent => "Rent",
            Category::Groceries => "Groceries",
            Category::Utilities => "Utilities",
            Category::Transportation => "Transportation",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::SoftwareTools => "Software/Tools",
            Category::LoanPayment => "Loan Payment",
            Category::Taxes => "Taxes",
            Category::Other => "Other",
        }
    }

    /// Look up a category by display name, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::label).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| UnknownLabel::new("category", s.trim(), &Category::labels()))
    }
}

/// Plain field bag for a transaction.
///
/// This is the unchecked shape used for construction and (de)serialization;
/// [`Transaction::new`] is the only way to turn it into a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// A single income or expense entry.
///
/// Invariants, checked in [`Transaction::new`]:
/// - `amount > 0`
/// - `due_date` is only set when `status == Due`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "TransactionFields", into = "TransactionFields")]
pub struct Transaction {
    id: String,
    date: NaiveDate,
    description: String,
    amount: Decimal,
    kind: TransactionType,
    category: Category,
    status: Status,
    counterparty: Option<String>,
    due_date: Option<NaiveDate>,
}

/// Largest amount a single record may carry. Keeps any realistic number of
/// records well inside `Decimal`'s range when summed.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0); // 10^15

impl Transaction {
    pub fn new(fields: TransactionFields) -> Result<Self, ValidationError> {
        if fields.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(fields.amount));
        }
        if fields.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(fields.amount));
        }
        if fields.due_date.is_some() && fields.status != Status::Due {
            return Err(ValidationError::DueDateWithoutDueStatus);
        }

        let TransactionFields {
            id,
            date,
            description,
            amount,
            kind,
            category,
            status,
            counterparty,
            due_date,
        } = fields;

        Ok(Self {
            id,
            date,
            description,
            amount,
            kind,
            category,
            status,
            counterparty,
            due_date,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Always strictly positive; direction comes from [`Transaction::kind`].
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn counterparty(&self) -> Option<&str> {
        self.counterparty.as_deref()
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_due(&self) -> bool {
        self.status == Status::Due
    }

    /// Copy the record back out into its field bag (e.g. to edit it).
    pub fn to_fields(&self) -> TransactionFields {
        self.clone().into()
    }
}

impl TryFrom<TransactionFields> for Transaction {
    type Error = ValidationError;

    fn try_from(fields: TransactionFields) -> Result<Self, Self::Error> {
        Transaction::new(fields)
    }
}

impl From<Transaction> for TransactionFields {
    fn from(t: Transaction) -> Self {
        TransactionFields {
            id: t.id,
            date: t.date,
            description: t.description,
            amount: t.amount,
            kind: t.kind,
            category: t.category,
            status: t.status,
            counterparty: t.counterparty,
            due_date: t.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fields() -> TransactionFields {
        TransactionFields {
            id: "tx-001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
            description: "Logo design for Acme".to_string(),
            amount: dec!(1000),
            kind: TransactionType::Income,
            category: Category::ClientWork,
            status: Status::Due,
            counterparty: Some("Acme".to_string()),
            due_date: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        }
    }

    #[test]
    fn test_transaction_creation_round_trips_fields() {
        let f = fields();
        let tx = Transaction::new(f.clone()).unwrap();
        assert_eq!(tx.id(), "tx-001");
        assert_eq!(tx.amount(), dec!(1000));
        assert!(tx.is_income());
        assert!(tx.is_due());
        assert_eq!(tx.counterparty(), Some("Acme"));
        assert_eq!(tx.to_fields(), f);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut f = fields();
        f.amount = dec!(0);
        assert_eq!(
            Transaction::new(f.clone()).unwrap_err(),
            ValidationError::NonPositiveAmount(dec!(0))
        );

        f.amount = dec!(-5.25);
        assert!(matches!(
            Transaction::new(f),
            Err(ValidationError::NonPositiveAmount(_))
        ));
    }

    fn huge() -> Decimal {
        Decimal::from_str("50000000000000000000000000000").unwrap()
    }

    #[test]
    fn test_rejects_amount_above_limit() {
        assert_eq!(MAX_AMOUNT, Decimal::from(10u64.pow(15)));
        let mut f = fields();
        f.amount = MAX_AMOUNT;
        assert!(Transaction::new(f.clone()).is_ok());

        f.amount = huge();
        assert_eq!(
            Transaction::new(f).unwrap_err(),
            ValidationError::AmountTooLarge(huge())
        );
    }

    #[test]
    fn test_paid_record_cannot_carry_due_date() {
        let mut f = fields();
        f.status = Status::Paid;
        assert_eq!(
            Transaction::new(f.clone()).unwrap_err(),
            ValidationError::DueDateWithoutDueStatus
        );

        f.due_date = None;
        let tx = Transaction::new(f).unwrap();
        assert_eq!(tx.due_date(), None);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::ALL.len(), 17);
        assert_eq!(Category::from_label("software/tools"), Some(Category::SoftwareTools));
        assert_eq!(Category::from_label("  Loan Payment "), Some(Category::LoanPayment));
        assert_eq!(Category::from_label("Crypto"), None);
        assert_eq!(Category::default(), Category::Other);
        assert!("Vacation".parse::<Category>().is_err());
    }

    #[test]
    fn test_type_and_status_parse() {
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!(" due ".parse::<Status>().unwrap(), Status::Due);
        assert!("pending".parse::<Status>().is_err());
    }

    #[test]
    fn test_json_shape_uses_original_field_names() {
        let tx = Transaction::new(fields()).unwrap();
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["type"], "income");
        assert_eq!(v["category"], "Client Work");
        assert_eq!(v["dueDate"], "2025-06-01");
        assert_eq!(v["amount"], "1000");

        let back: Transaction = serde_json::from_value(v).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let json = r#"{
            "id": "x", "date": "2025-01-01", "description": "bad",
            "amount": "-3", "type": "expense", "category": "Other", "status": "paid"
        }"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());

        let huge = r#"{
            "id": "y", "date": "2025-01-01", "description": "typo",
            "amount": "50000000000000000000000000000", "type": "income",
            "category": "Other", "status": "paid"
        }"#;
        assert!(serde_json::from_str::<Transaction>(huge).is_err());
    }
}
