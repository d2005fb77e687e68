//! Core types for extracted and persisted knowledge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of knowledge an entry captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Decision,
    Note,
    Gotcha,
    Preference,
    Discovery,
    Summary,
}

impl EntryType {
    pub const ALL: [EntryType; 6] = [
        EntryType::Decision,
        EntryType::Note,
        EntryType::Gotcha,
        EntryType::Preference,
        EntryType::Discovery,
        EntryType::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Decision => "decision",
            EntryType::Note => "note",
            EntryType::Gotcha => "gotcha",
            EntryType::Preference => "preference",
            EntryType::Discovery => "discovery",
            EntryType::Summary => "summary",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry type: {0}")]
pub struct ParseEntryTypeError(pub String);

impl FromStr for EntryType {
    type Err = ParseEntryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        EntryType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ParseEntryTypeError(s.to_string()))
    }
}

/// Candidate produced by a matcher; lives for one import pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    pub entry_type: EntryType,
    pub content: String,
    pub reasoning: Option<String>,
    pub confidence: f64,
    pub source_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Persisted knowledge entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub entry_type: EntryType,
    pub content: String,
    pub reasoning: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl Entry {
    /// Reasoning length in chars, zero when absent
    pub fn reasoning_len(&self) -> usize {
        self.reasoning
            .as_deref()
            .map(|r| r.chars().count())
            .unwrap_or(0)
    }

    /// Content and reasoning joined for matching
    pub fn searchable_text(&self) -> String {
        match &self.reasoning {
            Some(r) => format!("{} {}", self.content, r),
            None => self.content.clone(),
        }
    }
}

/// Entry about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub entry_type: EntryType,
    pub content: String,
    pub reasoning: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    pub metadata: serde_json::Value,
    pub tags: Vec<String>,
    pub files: Vec<String>,
}

impl NewEntry {
    pub fn new(entry_type: EntryType, content: impl Into<String>) -> Self {
        Self {
            entry_type,
            content: content.into(),
            reasoning: None,
            timestamp: Utc::now(),
            branch: None,
            commit_hash: None,
            metadata: serde_json::json!({}),
            tags: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_git(mut self, git: &crate::GitContext) -> Self {
        self.branch = git.branch.clone();
        self.commit_hash = git.commit.clone();
        self
    }
}

/// Per-transcript import bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub path: String,
    pub file_hash: String,
    pub last_message_id: Option<String>,
    pub last_message_timestamp: Option<DateTime<Utc>>,
    pub messages_imported: usize,
    pub entries_created: usize,
    pub import_timestamp: DateTime<Utc>,
}

/// Recorded coding session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub summary: Option<String>,
    pub branch: Option<String>,
    pub reason: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub entry_counts: BTreeMap<EntryType, usize>,
    #[serde(default)]
    pub user_requests: Vec<String>,
}

/// Session about to be written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSession {
    pub id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub branch: Option<String>,
    pub reason: Option<String>,
    pub files: Vec<String>,
    pub commands: Vec<String>,
    pub entry_counts: BTreeMap<EntryType, usize>,
    pub user_requests: Vec<String>,
}
