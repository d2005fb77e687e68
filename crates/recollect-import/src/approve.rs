use recollect_core::ExtractedEntry;
use std::path::Path;

/// Decides whether a file's new entries are committed in interactive imports
pub trait Approver {
    fn approve(&mut self, transcript: &Path, entries: &[ExtractedEntry]) -> bool;
}

/// Approves every file
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Approver for AcceptAll {
    fn approve(&mut self, _transcript: &Path, _entries: &[ExtractedEntry]) -> bool {
        true
    }
}
