#![allow(dead_code)]

use recollect_import::ImportOptions;
use recollect_store::Store;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn text_line(uuid: &str, role: &str, ts: &str, text: &str) -> String {
    json!({
        "type": role,
        "uuid": uuid,
        "sessionId": "session-1",
        "timestamp": ts,
        "message": {"role": role, "content": [{"type": "text", "text": text}]}
    })
    .to_string()
}

pub fn tool_use_line(uuid: &str, ts: &str, tool_id: &str, name: &str, input: serde_json::Value) -> String {
    json!({
        "type": "assistant",
        "uuid": uuid,
        "sessionId": "session-1",
        "timestamp": ts,
        "message": {"role": "assistant", "content": [
            {"type": "tool_use", "id": tool_id, "name": name, "input": input}
        ]}
    })
    .to_string()
}

pub fn tool_error_line(uuid: &str, ts: &str, tool_id: &str) -> String {
    json!({
        "type": "user",
        "uuid": uuid,
        "sessionId": "session-1",
        "timestamp": ts,
        "message": {"role": "user", "content": [
            {"type": "tool_result", "tool_use_id": tool_id, "content": "", "is_error": true}
        ]}
    })
    .to_string()
}

/// A short session with a decision, a gotcha and a preference
pub fn sample_lines() -> Vec<String> {
    vec![
        text_line(
            "u1",
            "user",
            "2025-03-01T10:00:00Z",
            "Let's use PostgreSQL because we need ACID guarantees",
        ),
        text_line(
            "a1",
            "assistant",
            "2025-03-01T10:00:05Z",
            "Watch out for stale lock files after a crash.",
        ),
        text_line(
            "u2",
            "user",
            "2025-03-01T10:01:00Z",
            "I prefer snake_case for all database columns.",
        ),
        text_line("a2", "assistant", "2025-03-01T10:01:10Z", "ok"),
    ]
}

pub fn write_transcript(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

pub fn append(path: &Path, lines: &[String]) {
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

pub fn open_store(dir: &Path) -> Store {
    Store::open(&dir.join("recollect.db")).unwrap()
}

pub fn execute() -> ImportOptions {
    ImportOptions {
        execute: true,
        ..ImportOptions::default()
    }
}
