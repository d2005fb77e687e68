//! SQLite-backed knowledge store: entries, full-text index, import ledger,
//! sessions, working state and the raw message archive

mod archive;
mod entries;
mod error;
mod ledger;
mod retry;
mod schema;
mod search;
mod sessions;
mod state;
mod store;

pub use archive::RawMessage;
pub use entries::{EntryFilter, EntryUpdate, InsertOutcome};
pub use error::{Result, StoreError};
pub use retry::with_busy_retry;
pub use schema::LATEST_SCHEMA_VERSION;
pub use search::IndexHit;
pub use state::{CurrentState, StateItem, StateKind};
pub use store::{Store, StoreCounts, StoreTx};
