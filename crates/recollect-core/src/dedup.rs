//! Identity of an entry for deduplication purposes

use crate::EntryType;
use sha2::{Digest, Sha256};

/// Lowercase content with all whitespace runs collapsed to a single space
pub fn normalize_content(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Hash of (type, normalized content); two entries with equal keys are duplicates
pub fn dedup_key(entry_type: EntryType, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry_type.as_str().as_bytes());
    hasher.update([0x1f]);
    hasher.update(normalize_content(content).as_bytes());
    hex::encode(hasher.finalize())
}
