//! RecordStore: in-memory list of transactions for one session.
//!
//! - Insertion order is kept; `update` replaces in place.
//! - Ids are the only uniqueness enforced.
//! - No persistence. The store is created when a session starts and dropped with it.

use crate::error::StoreError;
use crate::model::Transaction;

#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Transaction>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store, rejecting duplicate ids.
    pub fn with_records(records: Vec<Transaction>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for r in records {
            store.add(r)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.records.iter().find(|t| t.id() == id)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn add(&mut self, record: Transaction) -> Result<(), StoreError> {
        if self.get(record.id()).is_some() {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        tracing::info!(id = record.id(), kind = %record.kind(), amount = %record.amount(), "transaction added");
        self.records.push(record);
        Ok(())
    }

    /// Replace the record with the same id, returning the previous version.
    pub fn update(&mut self, record: Transaction) -> Result<Transaction, StoreError> {
        let idx = self.position(record.id())?;
        tracing::info!(id = record.id(), "transaction updated");
        Ok(std::mem::replace(&mut self.records[idx], record))
    }

    pub fn delete(&mut self, id: &str) -> Result<Transaction, StoreError> {
        let idx = self.position(id)?;
        tracing::info!(id, "transaction deleted");
        Ok(self.records.remove(idx))
    }

    /// Find a record by full id or by a unique id prefix.
    pub fn resolve(&self, prefix: &str) -> Result<&Transaction, StoreError> {
        let prefix = prefix.trim();
        if let Some(t) = self.get(prefix) {
            return Ok(t);
        }
        if prefix.is_empty() {
            return Err(StoreError::NotFound(prefix.to_string()));
        }

        let mut hits = self.records.iter().filter(|t| t.id().starts_with(prefix));
        match (hits.next(), hits.count()) {
            (None, _) => Err(StoreError::NotFound(prefix.to_string())),
            (Some(t), 0) => Ok(t),
            (Some(_), rest) => Err(StoreError::Ambiguous {
                prefix: prefix.to_string(),
                count: rest + 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Status, TransactionFields, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(id: &str, desc: &str) -> Transaction {
        Transaction::new(TransactionFields {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            description: desc.to_string(),
            amount: dec!(25),
            kind: TransactionType::Expense,
            category: Category::Groceries,
            status: Status::Paid,
            counterparty: None,
            due_date: None,
        })
        .unwrap()
    }

    #[test]
    fn add_appends_and_rejects_duplicate_ids() {
        let mut s = RecordStore::new();
        s.add(tx("a", "one")).unwrap();
        s.add(tx("b", "two")).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.records()[1].id(), "b");

        assert_eq!(s.add(tx("a", "again")), Err(StoreError::DuplicateId("a".to_string())));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut s = RecordStore::with_records(vec![tx("a", "one"), tx("b", "two")]).unwrap();
        let old = s.update(tx("a", "edited")).unwrap();
        assert_eq!(old.description(), "one");
        assert_eq!(s.records()[0].description(), "edited");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn update_and_delete_missing_id_are_errors() {
        let mut s = RecordStore::with_records(vec![tx("a", "one")]).unwrap();
        assert_eq!(
            s.update(tx("zzz", "ghost")),
            Err(StoreError::NotFound("zzz".to_string()))
        );
        assert_eq!(s.delete("zzz"), Err(StoreError::NotFound("zzz".to_string())));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn delete_removes_and_returns() {
        let mut s = RecordStore::with_records(vec![tx("a", "one"), tx("b", "two")]).unwrap();
        let gone = s.delete("a").unwrap();
        assert_eq!(gone.id(), "a");
        assert!(s.get("a").is_none());
        assert_eq!(s.records()[0].id(), "b");
    }

    #[test]
    fn resolve_by_unique_prefix() {
        let s = RecordStore::with_records(vec![tx("abc-1", "x"), tx("abd-2", "y"), tx("ab", "z")]).unwrap();
        assert_eq!(s.resolve("abc").unwrap().id(), "abc-1");
        // exact id wins over prefix matches
        assert_eq!(s.resolve("ab").unwrap().id(), "ab");
        assert_eq!(
            s.resolve("a"),
            Err(StoreError::Ambiguous {
                prefix: "a".to_string(),
                count: 3
            })
        );
        assert_eq!(s.resolve("q"), Err(StoreError::NotFound("q".to_string())));
    }
}
