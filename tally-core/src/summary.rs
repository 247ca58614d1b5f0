//! Aggregate totals over a view of transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Status, Transaction, TransactionType};

/// Derived totals; never stored, recomputed whenever the view changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`
    pub net_balance: Decimal,
    /// Income still marked due, i.e. owed to the user
    pub total_due_to_user: Decimal,
    /// Expenses still marked due, i.e. owed by the user
    pub total_user_owes: Decimal,
}

impl Summary {
    // Totals saturate at Decimal::MAX. Both stay non-negative, so the
    // difference always fits.
    fn add(&mut self, t: &Transaction) {
        let amount = t.amount();
        let due = t.status() == Status::Due;
        match t.kind() {
            TransactionType::Income => {
                self.total_income = self.total_income.checked_add(amount).unwrap_or(Decimal::MAX);
                if due {
                    self.total_due_to_user = self.total_due_to_user.checked_add(amount).unwrap_or(Decimal::MAX);
                }
            }
            TransactionType::Expense => {
                self.total_expenses = self.total_expenses.checked_add(amount).unwrap_or(Decimal::MAX);
                if due {
                    self.total_user_owes = self.total_user_owes.checked_add(amount).unwrap_or(Decimal::MAX);
                }
            }
        }
        self.net_balance = self.total_income - self.total_expenses;
    }
}

/// Reduce a view into a [`Summary`]. An empty view yields all zeros.
pub fn summarize<'a, I>(view: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    view.into_iter().fold(Summary::default(), |mut acc, t| {
        acc.add(t);
        acc
    })
}
