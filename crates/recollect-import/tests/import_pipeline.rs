mod common;

use common::*;
use recollect_core::{EntryType, ExtractedEntry};
use recollect_extract::{ExtractError, ExtractionStrategy, PatternStrategy};
use recollect_import::{import, import_status, ledger_key, AcceptAll, Approver, ImportOptions};
use recollect_store::EntryFilter;
use recollect_transcript::Message;
use serde_json::json;
use std::path::Path;

struct Decline;

impl Approver for Decline {
    fn approve(&mut self, _transcript: &Path, _entries: &[ExtractedEntry]) -> bool {
        false
    }
}

/// Pattern extraction that errors on one message id
struct FailOn(&'static str);

impl ExtractionStrategy for FailOn {
    fn name(&self) -> &str {
        "fail-on"
    }

    fn extract(&self, message: &Message) -> Result<Vec<ExtractedEntry>, ExtractError> {
        if message.id.as_deref() == Some(self.0) {
            return Err(ExtractError::Strategy {
                strategy: self.name().to_string(),
                message: self.0.to_string(),
                reason: "matcher panicked".to_string(),
            });
        }
        PatternStrategy::new().extract(message)
    }
}

#[test]
fn test_preview_writes_nothing() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());

    let summary = import(
        &mut store,
        &[path],
        &PatternStrategy::new(),
        &ImportOptions::default(),
        &mut AcceptAll,
    );
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.messages_scanned, 4);
    assert_eq!(summary.entries_created, 3);

    let counts = store.counts().unwrap();
    assert_eq!(counts.entries, 0);
    assert_eq!(counts.imports, 0);
    assert_eq!(counts.raw_messages, 0);
}

#[test]
fn test_execute_stores_entries_archive_and_ledger() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());

    let summary = import(&mut store, &[path.clone()], &PatternStrategy::new(), &execute(), &mut AcceptAll);
    assert_eq!(summary.entries_created, 3);
    assert_eq!(summary.files_failed, 0);

    let counts = store.counts().unwrap();
    assert_eq!(counts.entries, 3);
    assert_eq!(counts.indexed, 3);
    assert_eq!(counts.raw_messages, 4);

    let decision = store
        .list_entries(&EntryFilter {
            entry_type: Some(EntryType::Decision),
            ..EntryFilter::default()
        })
        .unwrap();
    assert_eq!(decision.len(), 1);
    assert!(decision[0].reasoning.as_deref().unwrap().contains("ACID guarantees"));
    assert_eq!(decision[0].metadata["source"], "import");
    assert_eq!(decision[0].metadata["source_message"], "u1");

    let key = ledger_key(&path);
    let raw = store.raw_messages(&key).unwrap();
    assert_eq!(raw.last().unwrap().noise, "acknowledgement");

    let ledger = import_status(&store).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].last_message_id.as_deref(), Some("a2"));
    assert_eq!(ledger[0].messages_imported, 4);
    assert_eq!(ledger[0].entries_created, 3);
}

#[test]
fn test_unchanged_file_is_noop() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let strategy = PatternStrategy::new();

    import(&mut store, &[path.clone()], &strategy, &execute(), &mut AcceptAll);
    let before = store.list_entries(&EntryFilter::default()).unwrap();
    let ledger_before = import_status(&store).unwrap();

    let second = import(&mut store, &[path], &strategy, &execute(), &mut AcceptAll);
    assert_eq!(second.entries_created, 0);
    assert_eq!(second.files_unchanged, 1);
    assert_eq!(second.messages_scanned, 0);
    assert_eq!(store.list_entries(&EntryFilter::default()).unwrap(), before);
    assert_eq!(import_status(&store).unwrap(), ledger_before);
}

#[test]
fn test_growing_file_resumes_after_cursor() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let strategy = PatternStrategy::new();

    import(&mut store, &[path.clone()], &strategy, &execute(), &mut AcceptAll);
    let first_ts = import_status(&store).unwrap()[0].last_message_timestamp;

    append(
        &path,
        &[
            text_line(
                "a3",
                "assistant",
                "2025-03-01T11:00:00Z",
                "Be careful with the migration lock when two importers run together.",
            ),
            // older clock on a later line must not move the ledger backwards
            text_line("u3", "user", "2025-03-01T09:00:00Z", "thanks"),
        ],
    );

    let second = import(&mut store, &[path], &strategy, &execute(), &mut AcceptAll);
    assert_eq!(second.messages_scanned, 2);
    assert_eq!(second.entries_created, 1);
    assert_eq!(second.duplicates_skipped, 0);

    let record = &import_status(&store).unwrap()[0];
    assert!(record.last_message_timestamp > first_ts);
    assert_eq!(record.last_message_id.as_deref(), Some("u3"));
    assert_eq!(record.messages_imported, 6);
    assert_eq!(record.entries_created, 4);
}

#[test]
fn test_rewritten_file_reprocesses_with_dedup() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let strategy = PatternStrategy::new();

    import(&mut store, &[path.clone()], &strategy, &execute(), &mut AcceptAll);

    // same content under new ids: the cursor is gone, dedup keeps the store clean
    let rewritten: Vec<String> = sample_lines()
        .into_iter()
        .map(|l| l.replace("\"u1\"", "\"x1\"").replace("\"a2\"", "\"x2\""))
        .collect();
    write_transcript(temp.path(), "s.jsonl", &rewritten);

    let second = import(&mut store, &[path], &strategy, &execute(), &mut AcceptAll);
    assert_eq!(second.messages_scanned, 4);
    assert_eq!(second.entries_created, 0);
    assert_eq!(second.duplicates_skipped, 3);
    assert_eq!(store.counts().unwrap().entries, 3);
}

#[test]
fn test_duplicates_across_files_first_write_wins() {
    let temp = tempfile::TempDir::new().unwrap();
    let first = write_transcript(temp.path(), "a.jsonl", &sample_lines());
    let second = write_transcript(
        temp.path(),
        "b.jsonl",
        &[
            text_line(
                "b1",
                "user",
                "2025-03-02T10:00:00Z",
                "let's use   postgresql because we need ACID guarantees",
            ),
            text_line(
                "b2",
                "user",
                "2025-03-02T10:00:01Z",
                "Let's use PostgreSQL because we need ACID guarantees",
            ),
        ],
    );
    let mut store = open_store(temp.path());

    let summary = import(
        &mut store,
        &[first, second],
        &PatternStrategy::new(),
        &execute(),
        &mut AcceptAll,
    );
    assert_eq!(summary.entries_created, 3);
    assert_eq!(summary.duplicates_skipped, 2);

    let decisions = store
        .list_entries(&EntryFilter {
            entry_type: Some(EntryType::Decision),
            ..EntryFilter::default()
        })
        .unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].content, "Let's use PostgreSQL");
}

#[test]
fn test_confidence_floor() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let options = ImportOptions {
        execute: true,
        min_confidence: 0.75,
        ..ImportOptions::default()
    };

    let summary = import(&mut store, &[path], &PatternStrategy::new(), &options, &mut AcceptAll);
    assert_eq!(summary.below_confidence, 1);
    assert_eq!(summary.entries_created, 2);

    for entry in store.list_entries(&EntryFilter::default()).unwrap() {
        assert_ne!(entry.entry_type, EntryType::Preference);
        assert!(entry.metadata["confidence"].as_f64().unwrap() >= 0.75);
    }
}

#[test]
fn test_tool_failure_without_text_is_stored() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(
        temp.path(),
        "s.jsonl",
        &[
            tool_use_line(
                "a1",
                "2025-03-01T10:00:00Z",
                "toolu_1",
                "Edit",
                json!({"file_path": "src/store.rs"}),
            ),
            tool_error_line("u1", "2025-03-01T10:00:01Z", "toolu_1"),
        ],
    );
    let mut store = open_store(temp.path());

    let summary = import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);
    assert_eq!(summary.entries_created, 1);

    let entries = store.list_entries(&EntryFilter::default()).unwrap();
    assert_eq!(entries[0].entry_type, EntryType::Gotcha);
    assert!(entries[0].content.contains("Edit"));
    assert_eq!(entries[0].files, vec!["src/store.rs"]);
}

#[test]
fn test_malformed_lines_counted_not_fatal() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut lines = sample_lines();
    lines.insert(1, "{not json".to_string());
    lines.insert(2, r#"{"type":"user","message":{"role":"user","content":"no timestamp"}}"#.to_string());
    let path = write_transcript(temp.path(), "s.jsonl", &lines);
    let mut store = open_store(temp.path());

    let summary = import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);
    assert_eq!(summary.malformed_lines, 2);
    assert_eq!(summary.entries_created, 3);
    assert_eq!(summary.files_failed, 0);
}

#[test]
fn test_missing_file_is_empty() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut store = open_store(temp.path());

    let summary = import(
        &mut store,
        &[temp.path().join("absent.jsonl")],
        &PatternStrategy::new(),
        &execute(),
        &mut AcceptAll,
    );
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.entries_created, 0);
    assert!(import_status(&store).unwrap().is_empty());
}

#[test]
fn test_declined_file_is_not_written() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let options = ImportOptions {
        execute: true,
        interactive: true,
        ..ImportOptions::default()
    };

    let summary = import(&mut store, &[path.clone()], &PatternStrategy::new(), &options, &mut Decline);
    assert_eq!(summary.files_declined, 1);
    assert_eq!(summary.entries_created, 0);
    assert_eq!(store.counts().unwrap().entries, 0);
    assert!(import_status(&store).unwrap().is_empty());

    // not recorded, so an approved run still picks it up
    let again = import(&mut store, &[path], &PatternStrategy::new(), &options, &mut AcceptAll);
    assert_eq!(again.entries_created, 3);
}

#[test]
fn test_failed_file_does_not_block_others() {
    let temp = tempfile::TempDir::new().unwrap();
    // a directory passes the existence check but cannot be hashed
    let broken = temp.path().join("broken.jsonl");
    std::fs::create_dir(&broken).unwrap();
    let good = write_transcript(temp.path(), "good.jsonl", &sample_lines());
    let mut store = open_store(temp.path());

    let summary = import(
        &mut store,
        &[broken, good.clone()],
        &PatternStrategy::new(),
        &execute(),
        &mut AcceptAll,
    );
    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.entries_created, 3);
    assert_eq!(store.counts().unwrap().entries, 3);

    let ledger = import_status(&store).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].path, ledger_key(&good));
}

#[test]
fn test_failing_message_skipped_others_stored() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());

    let summary = import(&mut store, &[path], &FailOn("a1"), &execute(), &mut AcceptAll);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.messages_scanned, 4);
    assert_eq!(summary.entries_created, 2);

    let entries = store.list_entries(&EntryFilter::default()).unwrap();
    let mut types: Vec<EntryType> = entries.iter().map(|e| e.entry_type).collect();
    types.sort_by_key(|t| t.as_str());
    assert_eq!(types, vec![EntryType::Decision, EntryType::Preference]);

    // the failing message is behind the cursor now
    let ledger = import_status(&store).unwrap();
    assert_eq!(ledger[0].last_message_id.as_deref(), Some("a2"));
}

#[test]
fn test_same_file_through_different_paths_shares_ledger_row() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let dotted = temp.path().join(".").join("s.jsonl");
    let mut store = open_store(temp.path());

    let first = import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);
    assert_eq!(first.entries_created, 3);

    let second = import(&mut store, &[dotted], &PatternStrategy::new(), &execute(), &mut AcceptAll);
    assert_eq!(second.files_unchanged, 1);
    assert_eq!(second.entries_created, 0);
    assert_eq!(import_status(&store).unwrap().len(), 1);
}
