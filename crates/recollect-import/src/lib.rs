//! Import pipeline from transcripts to stored knowledge
//!
//! Each transcript file is read, run through an extraction strategy,
//! filtered by confidence and deduplicated, then committed together with
//! its raw archive and ledger record in a single transaction. Entries
//! recorded by hand go through [`capture`].

mod approve;
mod capture;
mod pipeline;
mod session;

pub use approve::{AcceptAll, Approver};
pub use capture::{capture, Captured, ManualEntry};
pub use pipeline::{import, import_status, ledger_key, ImportOptions, ImportSummary};
pub use session::{build_session, write_session_summary};
