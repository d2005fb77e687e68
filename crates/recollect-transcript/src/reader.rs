//! Tolerant JSONL transcript reader
//!
//! One pass over the file produces two channels: parsed messages for extraction
//! and an unfiltered archive of every message line for browsing.

use crate::message::{ContentBlock, Message, Role};
use crate::noise::{classify, NoiseKind};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw message line retained for the archive regardless of extraction outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedLine {
    pub line: usize,
    pub message_id: Option<String>,
    pub parent_id: Option<String>,
    pub session_id: Option<String>,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub noise: NoiseKind,
    pub raw_json: String,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub path: PathBuf,
    pub messages: Vec<Message>,
    pub archive: Vec<ArchivedLine>,
    /// Session summary record, if the transcript carries one
    pub summary: Option<String>,
    /// Lines that were not valid message records
    pub malformed: usize,
    /// Well-formed records that are not messages (snapshots, metadata)
    pub ignored: usize,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages strictly after the one with `id`; `None` when the id is absent
    pub fn messages_after(&self, id: &str) -> Option<&[Message]> {
        self.messages
            .iter()
            .position(|m| m.id.as_deref() == Some(id))
            .map(|idx| &self.messages[idx + 1..])
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn max_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.timestamp).max()
    }
}

/// Read a transcript; a missing file is an empty transcript
pub fn read_transcript(path: &Path) -> Result<Transcript, TranscriptError> {
    let mut transcript = Transcript {
        path: path.to_path_buf(),
        ..Transcript::default()
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "transcript missing, treating as empty");
        return Ok(transcript);
    }

    let io_err = |source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut reader = BufReader::new(file);
    let mut tools: HashMap<String, (String, Value)> = HashMap::new();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(io_err)?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!(line = line_no, path = %path.display(), "skipping non-utf8 line");
            transcript.malformed += 1;
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value = match serde_json::from_str::<Value>(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(line = line_no, path = %path.display(), error = %e, "skipping malformed line");
                transcript.malformed += 1;
                continue;
            }
        };

        match parse_record(&value, line_no, &mut tools) {
            Record::Message(message) => {
                transcript.archive.push(ArchivedLine {
                    line: line_no,
                    message_id: message.id.clone(),
                    parent_id: message.parent_id.clone(),
                    session_id: message.session_id.clone(),
                    role: message.role,
                    timestamp: message.timestamp,
                    text: message.archive_text(),
                    noise: classify(&message),
                    raw_json: line.to_string(),
                });
                transcript.messages.push(message);
            }
            Record::Summary(summary) => {
                if transcript.summary.is_none() {
                    transcript.summary = Some(summary);
                }
            }
            Record::Other => transcript.ignored += 1,
            Record::Malformed(reason) => {
                tracing::warn!(line = line_no, path = %path.display(), reason, "skipping malformed record");
                transcript.malformed += 1;
            }
        }
    }

    Ok(transcript)
}

enum Record {
    Message(Message),
    Summary(String),
    Other,
    Malformed(&'static str),
}

fn parse_record(
    value: &Value,
    line: usize,
    tools: &mut HashMap<String, (String, Value)>,
) -> Record {
    let record_type = value.get("type").and_then(|t| t.as_str());
    if record_type == Some("summary") {
        return match value.get("summary").and_then(|s| s.as_str()) {
            Some(s) if !s.trim().is_empty() => Record::Summary(s.trim().to_string()),
            _ => Record::Other,
        };
    }

    let role_str = value
        .pointer("/message/role")
        .or_else(|| value.get("role"))
        .and_then(|r| r.as_str())
        .or(record_type);
    let content = value
        .pointer("/message/content")
        .or_else(|| value.get("content"));

    let Some(role) = role_str.and_then(Role::parse) else {
        return if content.is_some() {
            Record::Malformed("unknown role")
        } else {
            Record::Other
        };
    };
    let Some(content) = content else {
        return Record::Malformed("missing content");
    };
    let Some(timestamp) = value.get("timestamp").and_then(parse_timestamp_value) else {
        return Record::Malformed("missing or invalid timestamp");
    };

    let Some(blocks) = parse_blocks(content, tools) else {
        return Record::Malformed("unsupported content shape");
    };

    Record::Message(Message {
        line,
        id: string_field(value, &["uuid", "id"]),
        parent_id: string_field(value, &["parentUuid", "parent_id"]),
        session_id: string_field(value, &["sessionId", "session_id"]),
        role,
        blocks,
        timestamp,
    })
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn parse_blocks(
    content: &Value,
    tools: &mut HashMap<String, (String, Value)>,
) -> Option<Vec<ContentBlock>> {
    if let Some(s) = content.as_str() {
        return Some(vec![ContentBlock::Text(s.to_string())]);
    }
    let items = content.as_array()?;
    let mut blocks = Vec::new();
    for item in items {
        if let Some(s) = item.as_str() {
            blocks.push(ContentBlock::Text(s.to_string()));
            continue;
        }
        match item.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = item.get("text").and_then(|t| t.as_str()) {
                    blocks.push(ContentBlock::Text(text.to_string()));
                }
            }
            Some("tool_use") => {
                let id = item.get("id").and_then(|v| v.as_str()).map(String::from);
                let name = item
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                let input = item.get("input").cloned().unwrap_or(Value::Null);
                if let Some(id) = &id {
                    tools.insert(id.clone(), (name.clone(), input.clone()));
                }
                blocks.push(ContentBlock::ToolUse { id, name, input });
            }
            Some("tool_result") => {
                let tool_use_id = item
                    .get("tool_use_id")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                let linked = tool_use_id.as_ref().and_then(|id| tools.get(id));
                blocks.push(ContentBlock::ToolResult {
                    tool_name: linked.map(|(name, _)| name.clone()),
                    tool_input: linked.map(|(_, input)| input.clone()),
                    tool_use_id,
                    content: flatten_result_content(item.get("content")),
                    is_error: item
                        .get("is_error")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false),
                });
            }
            // thinking, images and future block types carry nothing to extract
            _ => {}
        }
    }
    Some(blocks)
}

fn flatten_result_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| {
                i.as_str()
                    .or_else(|| i.get("text").and_then(|t| t.as_str()))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Parse ISO-8601 with `Z` or an explicit offset; offset-less values are taken as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
