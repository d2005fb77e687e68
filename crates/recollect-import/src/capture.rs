use anyhow::Context;
use recollect_core::{Entry, EntryType, GitContext, NewEntry};
use recollect_store::{InsertOutcome, Store};

/// Knowledge recorded by hand rather than extracted from a transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    pub entry_type: EntryType,
    pub content: String,
    pub reasoning: Option<String>,
    pub tags: Vec<String>,
    pub files: Vec<String>,
}

impl ManualEntry {
    pub fn new(entry_type: EntryType, content: impl Into<String>) -> Self {
        Self {
            entry_type,
            content: content.into(),
            reasoning: None,
            tags: Vec::new(),
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Created(Entry),
    /// Same type and normalized content already stored
    Duplicate,
}

/// Store a manual entry, tagged `source: manual` with the current git context
pub fn capture(store: &mut Store, manual: ManualEntry) -> anyhow::Result<Captured> {
    let content = manual.content.trim();
    if content.is_empty() {
        anyhow::bail!("{} content is empty", manual.entry_type);
    }

    let mut entry = NewEntry::new(manual.entry_type, content)
        .with_tags(manual.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()))
        .with_files(manual.files.iter().map(|f| f.trim()).filter(|f| !f.is_empty()))
        .with_metadata(serde_json::json!({ "source": "manual" }))
        .with_git(&GitContext::detect());
    entry.reasoning = manual
        .reasoning
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    match store.insert_entry(&entry)? {
        InsertOutcome::Inserted(id) => {
            let stored = store
                .get_entry(&id)?
                .with_context(|| format!("entry {id} vanished after insert"))?;
            tracing::info!(id = %stored.id, entry_type = %stored.entry_type, "captured entry");
            Ok(Captured::Created(stored))
        }
        InsertOutcome::Duplicate => Ok(Captured::Duplicate),
    }
}
