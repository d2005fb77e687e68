//! Whole-message noise classification for the raw archive
//!
//! Labels are informational only. Extraction always runs on every message.

use crate::message::{Message, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Signal,
    ToolEcho,
    Acknowledgement,
    BareCode,
    SystemEcho,
    Empty,
}

impl NoiseKind {
    pub fn is_noise(&self) -> bool {
        !matches!(self, NoiseKind::Signal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseKind::Signal => "signal",
            NoiseKind::ToolEcho => "tool_echo",
            NoiseKind::Acknowledgement => "acknowledgement",
            NoiseKind::BareCode => "bare_code",
            NoiseKind::SystemEcho => "system_echo",
            NoiseKind::Empty => "empty",
        }
    }
}

const SYSTEM_MARKERS: &[&str] = &[
    "<command-name>",
    "<command-message>",
    "<local-command-stdout>",
    "<system-reminder>",
    "SessionStart:",
    "SessionEnd:",
    "[Request interrupted by user",
];

const ACK_WORDS: &[&str] = &[
    "ok", "okay", "k", "yes", "yep", "yeah", "no", "nope", "sure", "thanks", "thank", "you",
    "thx", "ty", "great", "good", "nice", "cool", "perfect", "done", "got", "it", "sounds",
    "lgtm", "continue", "go", "ahead", "proceed", "right", "correct", "awesome", "alright",
];

const ACK_MAX_WORDS: usize = 4;

pub fn classify(message: &Message) -> NoiseKind {
    let text = message.text();
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return if message.has_tool_blocks() {
            NoiseKind::ToolEcho
        } else {
            NoiseKind::Empty
        };
    }
    if message.role == Role::System || SYSTEM_MARKERS.iter().any(|m| trimmed.contains(m)) {
        return NoiseKind::SystemEcho;
    }
    if is_acknowledgement(trimmed) {
        return NoiseKind::Acknowledgement;
    }
    if is_bare_code(trimmed) {
        return NoiseKind::BareCode;
    }
    // a few words wrapped around a tool call are still an echo
    if message.has_tool_blocks() && trimmed.split_whitespace().count() < ACK_MAX_WORDS {
        return NoiseKind::ToolEcho;
    }
    NoiseKind::Signal
}

fn is_acknowledgement(text: &str) -> bool {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    !words.is_empty()
        && words.len() <= ACK_MAX_WORDS
        && words.iter().all(|w| ACK_WORDS.contains(&w.as_str()))
}

fn is_bare_code(text: &str) -> bool {
    if (text.starts_with('{') || text.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
    {
        return true;
    }
    if !text.contains("```") {
        return false;
    }
    // prose is whatever sits outside the fences
    let prose: usize = text
        .split("```")
        .step_by(2)
        .map(|p| p.split_whitespace().count())
        .sum();
    prose < ACK_MAX_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentBlock;
    use chrono::Utc;
    use serde_json::json;

    fn msg(role: Role, blocks: Vec<ContentBlock>) -> Message {
        Message {
            line: 1,
            id: None,
            parent_id: None,
            session_id: None,
            role,
            blocks,
            timestamp: Utc::now(),
        }
    }

    fn text(role: Role, s: &str) -> Message {
        msg(role, vec![ContentBlock::Text(s.to_string())])
    }

    #[test]
    fn test_acknowledgements() {
        assert_eq!(classify(&text(Role::User, "ok thanks!")), NoiseKind::Acknowledgement);
        assert_eq!(classify(&text(Role::User, "LGTM")), NoiseKind::Acknowledgement);
        assert_eq!(
            classify(&text(Role::User, "ok but use postgres instead")),
            NoiseKind::Signal
        );
    }

    #[test]
    fn test_tool_echo() {
        let m = msg(
            Role::Assistant,
            vec![ContentBlock::ToolUse {
                id: None,
                name: "Read".to_string(),
                input: json!({"file_path": "src/lib.rs"}),
            }],
        );
        assert_eq!(classify(&m), NoiseKind::ToolEcho);
        assert!(classify(&m).is_noise());
    }

    #[test]
    fn test_bare_code_and_json() {
        let code = "```rust\nfn main() {}\n```";
        assert_eq!(classify(&text(Role::Assistant, code)), NoiseKind::BareCode);
        assert_eq!(
            classify(&text(Role::Assistant, r#"{"ok": true}"#)),
            NoiseKind::BareCode
        );
        let explained = "Here is the entry point we settled on for the binary:\n```rust\nfn main() {}\n```";
        assert_eq!(classify(&text(Role::Assistant, explained)), NoiseKind::Signal);
    }

    #[test]
    fn test_system_echo_and_empty() {
        assert_eq!(
            classify(&text(Role::User, "<command-name>/clear</command-name>")),
            NoiseKind::SystemEcho
        );
        assert_eq!(classify(&text(Role::User, "   ")), NoiseKind::Empty);
    }
}
