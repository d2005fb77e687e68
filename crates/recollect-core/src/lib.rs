//! Domain types, configuration and identity rules shared by every recollect crate

mod config;
mod dedup;
mod git;
mod types;

pub use config::{ConfigError, Settings, Workspace};
pub use dedup::{dedup_key, normalize_content};
pub use git::GitContext;
pub use types::{
    Entry, EntryType, ExtractedEntry, ImportRecord, NewEntry, NewSession, ParseEntryTypeError,
    Session,
};
