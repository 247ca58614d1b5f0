//! Query pipeline: derive a filtered, sorted view from the record set.
//!
//! The view is recomputed from scratch on every change of records or criteria.
//! Filtering ANDs every active predicate. Sorting is stable: records with equal
//! keys keep their input order in both directions, and records missing an optional
//! sort key (counterparty, due date) always come after records that have one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownLabel;
use crate::model::{Category, Status, Transaction, TransactionType};

/// Optional predicates over the record set. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Case-insensitive text matched against description, counterparty and amount
    pub search: String,
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    /// Inclusive lower bound on the transaction date
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date
    pub end: Option<NaiveDate>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.kind.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        if self.kind.is_some_and(|k| t.kind() != k) {
            return false;
        }
        if self.category.is_some_and(|c| t.category() != c) {
            return false;
        }
        if self.status.is_some_and(|s| t.status() != s) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !search_matches(t, &needle) {
            return false;
        }

        if self.start.is_some_and(|start| t.date() < start) {
            return false;
        }
        if self.end.is_some_and(|end| t.date() > end) {
            return false;
        }

        true
    }
}

/// `needle` must already be lowercased.
fn search_matches(t: &Transaction, needle: &str) -> bool {
    t.description().to_lowercase().contains(needle)
        || t
            .counterparty()
            .is_some_and(|c| c.to_lowercase().contains(needle))
        || amount_text(t).contains(needle)
}

/// Plain decimal rendering used for search: no trailing zeros, no grouping.
fn amount_text(t: &Transaction) -> String {
    t.amount().normalize().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    #[default]
    Date,
    Description,
    Amount,
    #[serde(rename = "type")]
    Kind,
    Category,
    Status,
    Counterparty,
    DueDate,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Id,
        SortField::Date,
        SortField::Description,
        SortField::Amount,
        SortField::Kind,
        SortField::Category,
        SortField::Status,
        SortField::Counterparty,
        SortField::DueDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Date => "date",
            SortField::Description => "description",
            SortField::Amount => "amount",
            SortField::Kind => "type",
            SortField::Category => "category",
            SortField::Status => "status",
            SortField::Counterparty => "counterparty",
            SortField::DueDate => "due_date",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        match key.as_str() {
            "duedate" | "due" => return Ok(SortField::DueDate),
            "kind" => return Ok(SortField::Kind),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(SortField::as_str).collect();
                UnknownLabel::new("sort field", s.trim(), &names)
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(UnknownLabel::new("sort order", other, &["asc", "desc"])),
        }
    }
}

/// Field selector plus direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// Compare two records under this sort.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self.field {
            SortField::Id => self.order.apply(a.id().cmp(b.id())),
            SortField::Date => self.order.apply(a.date().cmp(&b.date())),
            SortField::Description => self.order.apply(a.description().cmp(b.description())),
            SortField::Amount => self.order.apply(a.amount().cmp(&b.amount())),
            SortField::Kind => self.order.apply(a.kind().as_str().cmp(b.kind().as_str())),
            SortField::Category => self
                .order
                .apply(a.category().label().cmp(b.category().label())),
            SortField::Status => self.order.apply(a.status().as_str().cmp(b.status().as_str())),
            SortField::Counterparty => compare_optional(a.counterparty(), b.counterparty(), self.order),
            SortField::DueDate => compare_optional(a.due_date(), b.due_date(), self.order),
        }
    }
}

/// Present values follow `order`; missing values go last either way.
fn compare_optional<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Records matching every active predicate, in input order.
pub fn filter<'a>(records: &'a [Transaction], filter: &Filter) -> Vec<&'a Transaction> {
    records.iter().filter(|t| filter.matches(t)).collect()
}

/// Stable in-place sort of a borrowed view.
pub fn sort(view: &mut [&Transaction], sort: Sort) {
    view.sort_by(|a, b| sort.compare(a, b));
}

/// Filter then sort, returning an owned view.
pub fn apply(records: &[Transaction], criteria: &Filter, order: Sort) -> Vec<Transaction> {
    let mut view = filter(records, criteria);
    sort(&mut view, order);
    tracing::debug!(
        total = records.len(),
        matched = view.len(),
        sort = %order.field,
        order = order.order.as_str(),
        "view recomputed"
    );
    view.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionFields;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(id: &str, day: u32, desc: &str, amount: Decimal, kind: TransactionType) -> Transaction {
        Transaction::new(TransactionFields {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            description: desc.to_string(),
            amount,
            kind,
            category: Category::Other,
            status: Status::Paid,
            counterparty: None,
            due_date: None,
        })
        .unwrap()
    }

    fn ids(view: &[&Transaction]) -> Vec<String> {
        view.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn test_search_matches_amount_rendering() {
        let records = vec![
            tx("a", 1, "Coffee", dec!(12.50), TransactionType::Expense),
            tx("b", 2, "Rent", dec!(1000), TransactionType::Expense),
        ];
        let f = Filter {
            search: "12.5".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&filter(&records, &f)), vec!["a"]);

        let f = Filter {
            search: "1000".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&filter(&records, &f)), vec!["b"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let records = vec![tx("a", 1, "Monthly RENT", dec!(900), TransactionType::Expense)];
        let f = Filter {
            search: "  rent ".to_string(),
            ..Filter::default()
        };
        assert_eq!(filter(&records, &f).len(), 1);
    }

    #[test]
    fn test_blank_search_is_inactive() {
        let f = Filter {
            search: "   ".to_string(),
            ..Filter::default()
        };
        assert!(f.is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let records = vec![
            tx("a", 1, "x", dec!(1), TransactionType::Expense),
            tx("b", 5, "x", dec!(1), TransactionType::Expense),
            tx("c", 9, "x", dec!(1), TransactionType::Expense),
        ];
        let f = Filter {
            start: NaiveDate::from_ymd_opt(2025, 3, 5),
            end: NaiveDate::from_ymd_opt(2025, 3, 9),
            ..Filter::default()
        };
        assert_eq!(ids(&filter(&records, &f)), vec!["b", "c"]);

        let only_end = Filter {
            end: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Filter::default()
        };
        assert_eq!(ids(&filter(&records, &only_end)), vec!["a"]);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let records = vec![
            tx("a", 1, "x", dec!(5), TransactionType::Expense),
            tx("b", 2, "x", dec!(5), TransactionType::Expense),
            tx("c", 3, "x", dec!(1), TransactionType::Expense),
        ];
        let mut view: Vec<&Transaction> = records.iter().collect();
        sort(&mut view, Sort::asc(SortField::Amount));
        assert_eq!(ids(&view), vec!["c", "a", "b"]);

        let mut view: Vec<&Transaction> = records.iter().collect();
        sort(&mut view, Sort::desc(SortField::Amount));
        assert_eq!(ids(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_type_sorts_by_label() {
        let records = vec![
            tx("inc", 1, "x", dec!(1), TransactionType::Income),
            tx("exp", 2, "x", dec!(1), TransactionType::Expense),
        ];
        let mut view: Vec<&Transaction> = records.iter().collect();
        sort(&mut view, Sort::asc(SortField::Kind));
        assert_eq!(ids(&view), vec!["exp", "inc"]);
    }

    #[test]
    fn test_missing_counterparty_sorts_last_either_way() {
        let with = |id: &str, cp: Option<&str>| {
            let mut f = tx(id, 1, "x", dec!(1), TransactionType::Expense).to_fields();
            f.counterparty = cp.map(str::to_string);
            Transaction::new(f).unwrap()
        };
        let records = vec![with("none", None), with("bob", Some("Bob")), with("amy", Some("Amy"))];

        let mut view: Vec<&Transaction> = records.iter().collect();
        sort(&mut view, Sort::asc(SortField::Counterparty));
        assert_eq!(ids(&view), vec!["amy", "bob", "none"]);

        sort(&mut view, Sort::desc(SortField::Counterparty));
        assert_eq!(ids(&view), vec!["bob", "amy", "none"]);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("due-date".parse::<SortField>().unwrap(), SortField::DueDate);
        assert_eq!("Type".parse::<SortField>().unwrap(), SortField::Kind);
        assert!("colour".parse::<SortField>().is_err());
        assert_eq!(Sort::default(), Sort::desc(SortField::Date));
    }
}
