//! Session: everything one run of the app holds in memory.
//!
//! Created at startup and dropped at exit. Owns the record store, the current
//! filter and sort, the entry draft, and the interpreting flag that keeps a
//! second free-text request from starting while one is in flight.

use chrono::NaiveDate;

use crate::draft::Draft;
use crate::error::SessionError;
use crate::model::Transaction;
use crate::parsed::ParsedTransaction;
use crate::query::{self, Filter, Sort};
use crate::store::RecordStore;
use crate::summary::{self, Summary};

#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    filter: Filter,
    sort: Sort,
    draft: Draft,
    today: NaiveDate,
    interpreting: bool,
}

/// What a successful draft submission did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    Added(Transaction),
    Updated(Transaction),
}

impl Session {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_store(RecordStore::new(), today)
    }

    pub fn with_store(store: RecordStore, today: NaiveDate) -> Self {
        Self {
            store,
            filter: Filter::default(),
            sort: Sort::default(),
            draft: Draft::new(today),
            today,
            interpreting: false,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Move the session's notion of today, e.g. after local midnight. Only
    /// drafts started afterwards pick it up.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn is_interpreting(&self) -> bool {
        self.interpreting
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter_mut(&mut self) -> &mut Filter {
        &mut self.filter
    }

    pub fn reset_filter(&mut self) {
        self.filter = Filter::default();
    }

    pub fn set_sort(&mut self, sort: Sort) {
        self.sort = sort;
    }

    /// Current filtered and sorted view.
    pub fn view(&self) -> Vec<Transaction> {
        query::apply(self.store.records(), &self.filter, self.sort)
    }

    /// Totals over the current view (not the whole store).
    pub fn summary(&self) -> Summary {
        summary::summarize(query::filter(self.store.records(), &self.filter))
    }

    /// Start a blank draft, discarding any unsaved one.
    pub fn new_draft(&mut self) {
        self.draft = Draft::new(self.today);
    }

    /// Load an existing record (by id or unique prefix) into the draft.
    pub fn edit(&mut self, id: &str) -> Result<&Draft, SessionError> {
        let record = self.store.resolve(id)?;
        self.draft = Draft::from_transaction(record);
        Ok(&self.draft)
    }

    /// Validate the draft and add or update the store. On success the draft is
    /// reset; on failure nothing changes.
    pub fn submit_draft(&mut self) -> Result<Saved, SessionError> {
        let record = self.draft.submit()?;
        let saved = if self.draft.is_editing() {
            self.store.update(record.clone())?;
            Saved::Updated(record)
        } else {
            self.store.add(record.clone())?;
            Saved::Added(record)
        };
        self.new_draft();
        Ok(saved)
    }

    pub fn delete(&mut self, id: &str) -> Result<Transaction, SessionError> {
        let id = self.store.resolve(id)?.id().to_string();
        let removed = self.store.delete(&id)?;
        if self.draft.editing_id() == Some(id.as_str()) {
            self.new_draft();
        }
        Ok(removed)
    }

    /// Mark a free-text request as in flight. Refused while another one is.
    pub fn begin_interpreting(&mut self) -> Result<(), SessionError> {
        if self.interpreting {
            return Err(SessionError::Busy);
        }
        self.interpreting = true;
        Ok(())
    }

    /// Clear the in-flight flag and, on success, fill the draft. A failed request
    /// (`None`) leaves the draft exactly as it was.
    pub fn finish_interpreting(&mut self, parsed: Option<&ParsedTransaction>) -> Result<(), SessionError> {
        if !self.interpreting {
            return Err(SessionError::NotInterpreting);
        }
        self.interpreting = false;
        if let Some(p) = parsed {
            self.draft.apply_parsed(p);
        }
        Ok(())
    }
}
