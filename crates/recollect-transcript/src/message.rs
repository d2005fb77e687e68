//! Message model for transcript records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" | "human" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One typed block of message content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    ToolUse {
        id: Option<String>,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: Option<String>,
        /// Name of the originating tool call, when it appeared earlier in the file
        tool_name: Option<String>,
        tool_input: Option<Value>,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// 1-based line number in the transcript
    pub line: usize,
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub session_id: Option<String>,
    pub role: Role,
    pub blocks: Vec<ContentBlock>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Text blocks joined into the body matchers run on
    pub fn text(&self) -> String {
        let parts: Vec<&str> = self
            .blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text(t) => Some(t.trim()),
                _ => None,
            })
            .filter(|t| !t.is_empty())
            .collect();
        parts.join("\n\n")
    }

    /// Every block rendered for the browsable archive
    pub fn archive_text(&self) -> String {
        let parts: Vec<String> = self
            .blocks
            .iter()
            .map(|b| match b {
                ContentBlock::Text(t) => t.clone(),
                ContentBlock::ToolUse { name, input, .. } => format!("[tool_use {}] {}", name, input),
                ContentBlock::ToolResult {
                    tool_name,
                    content,
                    is_error,
                    ..
                } => format!(
                    "[tool_result {}{}] {}",
                    tool_name.as_deref().unwrap_or("?"),
                    if *is_error { " error" } else { "" },
                    content
                ),
            })
            .collect();
        parts.join("\n")
    }

    pub fn has_tool_blocks(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| !matches!(b, ContentBlock::Text(_)))
    }

    /// Tool results flagged as errors
    pub fn failed_tool_results(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolResult { is_error: true, .. }))
    }

    /// File paths touched by tool calls in (or linked from) this message
    pub fn referenced_files(&self) -> Vec<String> {
        let mut files = BTreeSet::new();
        for block in &self.blocks {
            let input = match block {
                ContentBlock::ToolUse { input, .. } => Some(input),
                ContentBlock::ToolResult { tool_input, .. } => tool_input.as_ref(),
                ContentBlock::Text(_) => None,
            };
            if let Some(input) = input {
                collect_files(input, &mut files);
            }
        }
        files.into_iter().collect()
    }

    /// Shell commands issued through the Bash tool
    pub fn commands(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { name, input, .. } if name == "Bash" => input
                    .get("command")
                    .and_then(|c| c.as_str())
                    .map(|c| c.to_string()),
                _ => None,
            })
            .collect()
    }
}

fn collect_files(input: &Value, files: &mut BTreeSet<String>) {
    // Read, Edit, Write: file_path; Grep, Glob: path; NotebookEdit: notebook_path
    for key in ["file_path", "path", "notebook_path"] {
        if let Some(p) = input.get(key).and_then(|v| v.as_str()) {
            if !p.is_empty() {
                files.insert(p.to_string());
            }
        }
    }
    if let Some(cmd) = input.get("command").and_then(|v| v.as_str()) {
        for token in cmd.split_whitespace() {
            if token.contains('/') && !token.starts_with('-') && !token.contains("://") {
                files.insert(token.to_string());
            }
        }
    }
}
