//! tally-core: records, store, query pipeline, aggregator and entry draft
//! for the Tally personal finance tracker.

pub mod draft;
pub mod error;
pub mod model;
pub mod parsed;
pub mod query;
pub mod session;
pub mod store;
pub mod summary;

pub use draft::{Draft, DraftField};
pub use error::{SessionError, StoreError, UnknownLabel, ValidationError};
pub use model::{Category, Status, Transaction, TransactionFields, TransactionType};
pub use parsed::{CategorySuggestion, ParsedTransaction};
pub use query::{Filter, Sort, SortField, SortOrder};
pub use session::{Saved, Session};
pub use store::RecordStore;
pub use summary::{Summary, summarize};
