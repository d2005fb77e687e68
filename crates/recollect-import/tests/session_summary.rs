mod common;

use common::*;
use recollect_core::EntryType;
use recollect_extract::PatternStrategy;
use recollect_import::write_session_summary;
use serde_json::json;

#[test]
fn test_session_summary_from_transcript() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut lines = sample_lines();
    lines.push(tool_use_line(
        "a3",
        "2025-03-01T10:30:00Z",
        "toolu_1",
        "Bash",
        json!({"command": "cargo test src/lib.rs"}),
    ));
    lines.push(json!({"type": "summary", "summary": "Storage backend choice"}).to_string());
    let path = write_transcript(temp.path(), "s.jsonl", &lines);
    let mut store = open_store(temp.path());

    let session = write_session_summary(&mut store, &path, &PatternStrategy::new(), Some("exit"))
        .unwrap()
        .unwrap();
    assert_eq!(session.id, "session-1");
    assert_eq!(session.duration_minutes, 30);
    assert_eq!(session.summary.as_deref(), Some("Storage backend choice"));
    assert_eq!(session.reason.as_deref(), Some("exit"));
    assert_eq!(session.files, vec!["src/lib.rs"]);
    assert_eq!(session.commands, vec!["cargo test src/lib.rs"]);
    assert_eq!(session.entry_counts.get(&EntryType::Decision), Some(&1));
    assert_eq!(session.entry_counts.get(&EntryType::Gotcha), Some(&1));
    assert_eq!(session.user_requests.len(), 2);
}

#[test]
fn test_session_summary_is_recorded_once() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    let strategy = PatternStrategy::new();

    let first = write_session_summary(&mut store, &path, &strategy, None).unwrap().unwrap();
    let second = write_session_summary(&mut store, &path, &strategy, None).unwrap().unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(store.list_sessions(10).unwrap().len(), 1);
    // no summary record: the first request stands in
    assert_eq!(
        first.summary.as_deref(),
        Some("Let's use PostgreSQL because we need ACID guarantees")
    );
}

#[test]
fn test_empty_transcript_records_nothing() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut store = open_store(temp.path());

    let result = write_session_summary(
        &mut store,
        &temp.path().join("absent.jsonl"),
        &PatternStrategy::new(),
        None,
    )
    .unwrap();
    assert!(result.is_none());
    assert!(store.last_session().unwrap().is_none());
}

#[test]
fn test_transcript_without_session_id_recorded_once() {
    let temp = tempfile::TempDir::new().unwrap();
    let lines: Vec<String> = ["u1", "a1"]
        .iter()
        .enumerate()
        .map(|(i, uuid)| {
            json!({
                "type": if i == 0 { "user" } else { "assistant" },
                "uuid": uuid,
                "timestamp": format!("2025-03-01T10:0{i}:00Z"),
                "message": {"role": if i == 0 { "user" } else { "assistant" }, "content": "Let's use SQLite for the cache"}
            })
            .to_string()
        })
        .collect();
    let path = write_transcript(temp.path(), "anon.jsonl", &lines);
    let mut store = open_store(temp.path());
    let strategy = PatternStrategy::new();

    let first = write_session_summary(&mut store, &path, &strategy, None).unwrap().unwrap();
    let second = write_session_summary(&mut store, &path, &strategy, None).unwrap().unwrap();
    assert!(first.id.starts_with("derived-"));
    assert_eq!(first.id, second.id);
    assert_eq!(store.list_sessions(10).unwrap().len(), 1);
}
