use crate::approve::Approver;
use anyhow::Context;
use chrono::Utc;
use recollect_core::{dedup_key, ExtractedEntry, GitContext, ImportRecord, NewEntry};
use recollect_extract::ExtractionStrategy;
use recollect_store::{InsertOutcome, RawMessage, Store};
use recollect_transcript::{file_hash, read_transcript, ArchivedLine, Message, Transcript};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Write to the store; without it the run is a preview
    pub execute: bool,
    /// Ask the approver before committing each file
    pub interactive: bool,
    pub min_confidence: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            execute: false,
            interactive: false,
            min_confidence: 0.6,
        }
    }
}

/// Counts reported for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub files_scanned: usize,
    pub messages_scanned: usize,
    /// Entries written, or that would be written in a preview
    pub entries_created: usize,
    pub duplicates_skipped: usize,
    pub below_confidence: usize,
    pub files_unchanged: usize,
    pub files_declined: usize,
    pub files_failed: usize,
    pub malformed_lines: usize,
}

/// Per-file result folded into the run summary
#[derive(Debug, Default)]
struct FileReport {
    unchanged: bool,
    declined: bool,
    messages: usize,
    created: usize,
    duplicates: usize,
    below_confidence: usize,
    malformed: usize,
}

impl ImportSummary {
    fn absorb(&mut self, report: FileReport) {
        if report.unchanged {
            self.files_unchanged += 1;
        }
        if report.declined {
            self.files_declined += 1;
        }
        self.messages_scanned += report.messages;
        self.entries_created += report.created;
        self.duplicates_skipped += report.duplicates;
        self.below_confidence += report.below_confidence;
        self.malformed_lines += report.malformed;
    }
}

/// Import transcripts; a failing file is rolled back and counted, the rest continue
pub fn import(
    store: &mut Store,
    paths: &[PathBuf],
    strategy: &dyn ExtractionStrategy,
    options: &ImportOptions,
    approver: &mut dyn Approver,
) -> ImportSummary {
    let git = GitContext::detect();
    let mut summary = ImportSummary::default();

    for path in paths {
        summary.files_scanned += 1;
        match import_file(store, path, strategy, options, approver, &git) {
            Ok(report) => summary.absorb(report),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "import failed, batch rolled back");
                summary.files_failed += 1;
            }
        }
    }

    tracing::info!(
        files = summary.files_scanned,
        created = summary.entries_created,
        duplicates = summary.duplicates_skipped,
        execute = options.execute,
        "import finished"
    );
    summary
}

/// Ledger records, most recent import first
pub fn import_status(store: &Store) -> anyhow::Result<Vec<ImportRecord>> {
    store.list_imports().context("failed to read import ledger")
}

fn import_file(
    store: &mut Store,
    path: &Path,
    strategy: &dyn ExtractionStrategy,
    options: &ImportOptions,
    approver: &mut dyn Approver,
    git: &GitContext,
) -> anyhow::Result<FileReport> {
    let mut report = FileReport::default();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "transcript missing, nothing to import");
        return Ok(report);
    }

    let key = ledger_key(path);
    let hash = file_hash(path).with_context(|| format!("failed to hash {}", path.display()))?;
    let previous = store.get_import(&key)?;
    if previous.as_ref().map(|p| p.file_hash.as_str()) == Some(hash.as_str()) {
        tracing::debug!(path = %key, "unchanged since last import");
        report.unchanged = true;
        return Ok(report);
    }

    let transcript = read_transcript(path)?;
    report.malformed = transcript.malformed;
    let pending = pending_messages(&transcript, previous.as_ref());
    report.messages = pending.len();

    let mut batch_keys = HashSet::new();
    let mut accepted = Vec::new();
    for message in pending {
        let candidates = match strategy.extract(message) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %key, line = message.line, error = %e, "extraction failed, skipping message");
                continue;
            }
        };
        for candidate in candidates {
            if candidate.confidence < options.min_confidence {
                report.below_confidence += 1;
                continue;
            }
            let dedup = dedup_key(candidate.entry_type, &candidate.content);
            if !batch_keys.insert(dedup.clone()) || store.contains_key(&dedup)? {
                report.duplicates += 1;
                continue;
            }
            accepted.push(candidate);
        }
    }

    if !options.execute {
        report.created = accepted.len();
        return Ok(report);
    }
    if options.interactive && !approver.approve(path, &accepted) {
        tracing::info!(path = %key, "import declined");
        report.declined = true;
        return Ok(report);
    }

    let tx = store.transaction()?;
    for candidate in &accepted {
        match tx.insert_entry(&to_new_entry(candidate, &key, git))? {
            InsertOutcome::Inserted(_) => report.created += 1,
            InsertOutcome::Duplicate => report.duplicates += 1,
        }
    }
    let raw: Vec<RawMessage> = transcript
        .archive
        .iter()
        .map(|line| to_raw(line, &key))
        .collect();
    tx.archive(&raw)?;
    tx.upsert_import(&ImportRecord {
        path: key.clone(),
        file_hash: hash,
        last_message_id: transcript.messages.iter().rev().find_map(|m| m.id.clone()),
        last_message_timestamp: transcript.max_timestamp(),
        messages_imported: previous.as_ref().map_or(0, |p| p.messages_imported) + report.messages,
        entries_created: previous.as_ref().map_or(0, |p| p.entries_created) + report.created,
        import_timestamp: Utc::now(),
    })?;
    tx.commit()
        .with_context(|| format!("failed to commit import of {key}"))?;

    tracing::info!(path = %key, messages = report.messages, created = report.created, "imported transcript");
    Ok(report)
}

/// Ledger key for a transcript: its canonical path, so `./a.jsonl` and `dir/a.jsonl` share a row
pub fn ledger_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Messages after the ledger cursor, or the whole transcript when the cursor is gone
fn pending_messages<'a>(transcript: &'a Transcript, previous: Option<&ImportRecord>) -> &'a [Message] {
    let cursor = previous.and_then(|p| p.last_message_id.as_deref());
    match cursor {
        Some(id) => match transcript.messages_after(id) {
            Some(rest) => rest,
            None => {
                tracing::debug!(cursor = id, "cursor not found, reprocessing whole transcript");
                &transcript.messages
            }
        },
        None => &transcript.messages,
    }
}

fn to_new_entry(candidate: &ExtractedEntry, transcript: &str, git: &GitContext) -> NewEntry {
    let mut entry = NewEntry::new(candidate.entry_type, candidate.content.clone())
        .with_timestamp(candidate.timestamp)
        .with_files(candidate.files.iter().cloned())
        .with_metadata(serde_json::json!({
            "source": "import",
            "confidence": candidate.confidence,
            "source_message": candidate.source_message,
            "transcript": transcript,
        }))
        .with_git(git);
    entry.reasoning = candidate.reasoning.clone();
    entry
}

fn to_raw(line: &ArchivedLine, transcript: &str) -> RawMessage {
    RawMessage {
        transcript: transcript.to_string(),
        line: line.line,
        message_id: line.message_id.clone(),
        parent_id: line.parent_id.clone(),
        session_id: line.session_id.clone(),
        role: line.role.as_str().to_string(),
        timestamp: line.timestamp,
        text: line.text.clone(),
        noise: line.noise.as_str().to_string(),
        raw_json: line.raw_json.clone(),
    }
}
