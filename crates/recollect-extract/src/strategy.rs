//! Extraction strategies and the built-in pattern registry

use crate::matchers::{MatchContext, MatcherKind};
use crate::scoring::{Scorer, StaticTiers};
use recollect_core::{dedup_key, ExtractedEntry};
use recollect_transcript::Message;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{strategy} failed on message {message}: {reason}")]
    Strategy {
        strategy: String,
        message: String,
        reason: String,
    },
}

/// Turns one message into scored candidates
///
/// Implementations must be independent per message so a failure on one
/// message never affects the rest of the transcript.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, message: &Message) -> Result<Vec<ExtractedEntry>, ExtractError>;
}

/// Registry of pattern matchers sharing one scorer
pub struct PatternStrategy {
    matchers: Vec<MatcherKind>,
    scorer: Box<dyn Scorer>,
    summary_min_chars: usize,
}

impl PatternStrategy {
    /// Create a strategy with no matchers registered
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
            scorer: Box::new(StaticTiers::default()),
            summary_min_chars: 80,
        }
    }

    /// Create a strategy with every built-in matcher
    pub fn new() -> Self {
        let mut strategy = Self::empty();
        for kind in MatcherKind::ALL {
            strategy.register(kind);
        }
        strategy
    }

    pub fn register(&mut self, kind: MatcherKind) {
        if !self.matchers.contains(&kind) {
            self.matchers.push(kind);
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_summary_min_chars(mut self, chars: usize) -> Self {
        self.summary_min_chars = chars;
        self
    }

    pub fn matchers(&self) -> &[MatcherKind] {
        &self.matchers
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Default for PatternStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for PatternStrategy {
    fn name(&self) -> &str {
        "pattern"
    }

    fn extract(&self, message: &Message) -> Result<Vec<ExtractedEntry>, ExtractError> {
        let ctx = MatchContext::new(message, self.summary_min_chars);
        let has_text = !ctx.text.trim().is_empty();
        let files = message.referenced_files();

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for matcher in &self.matchers {
            if matcher.needs_text() && !has_text {
                continue;
            }
            for candidate in matcher.run(&ctx) {
                if !seen.insert(dedup_key(candidate.entry_type, &candidate.content)) {
                    continue;
                }
                let confidence = self.scorer.score(&candidate);
                entries.push(ExtractedEntry {
                    entry_type: candidate.entry_type,
                    content: candidate.content,
                    reasoning: candidate.reasoning,
                    confidence,
                    source_message: message.id.clone(),
                    timestamp: message.timestamp,
                    files: files.clone(),
                });
            }
        }

        if !entries.is_empty() {
            tracing::debug!(
                message = message.id.as_deref().unwrap_or("-"),
                count = entries.len(),
                "extracted candidates"
            );
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::Candidate;
    use chrono::Utc;
    use recollect_core::EntryType;
    use recollect_transcript::{ContentBlock, Role};
    use serde_json::json;

    fn message(role: Role, blocks: Vec<ContentBlock>) -> Message {
        Message {
            line: 1,
            id: Some("msg-1".to_string()),
            parent_id: None,
            session_id: None,
            role,
            blocks,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_registry_registers_once() {
        let mut strategy = PatternStrategy::empty();
        assert!(strategy.is_empty());
        strategy.register(MatcherKind::Gotcha);
        strategy.register(MatcherKind::Gotcha);
        assert_eq!(strategy.len(), 1);
        assert_eq!(PatternStrategy::new().len(), MatcherKind::ALL.len());
    }

    #[test]
    fn test_decision_scenario() {
        let msg = message(
            Role::User,
            vec![ContentBlock::Text(
                "Let's use PostgreSQL because we need ACID guarantees".to_string(),
            )],
        );
        let entries = PatternStrategy::new().extract(&msg).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Decision);
        assert!(entries[0]
            .reasoning
            .as_deref()
            .unwrap()
            .contains("ACID guarantees"));
        assert_eq!(entries[0].confidence, 0.8);
        assert_eq!(entries[0].source_message.as_deref(), Some("msg-1"));
    }

    #[test]
    fn test_tool_failure_with_empty_text() {
        let msg = message(
            Role::User,
            vec![ContentBlock::ToolResult {
                tool_use_id: Some("toolu_9".to_string()),
                tool_name: Some("Edit".to_string()),
                tool_input: Some(json!({"file_path": "src/store.rs"})),
                content: String::new(),
                is_error: true,
            }],
        );
        let entries = PatternStrategy::new().extract(&msg).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Gotcha);
        assert_eq!(entries[0].confidence, 0.9);
        assert_eq!(entries[0].files, vec!["src/store.rs"]);
    }

    #[test]
    fn test_multiple_types_from_one_message() {
        let msg = message(
            Role::Assistant,
            vec![ContentBlock::Text(
                "We decided to keep WAL mode enabled for the store. \
                 Watch out for stale lock files after a crash."
                    .to_string(),
            )],
        );
        let entries = PatternStrategy::new().extract(&msg).unwrap();
        let types: Vec<_> = entries.iter().map(|e| e.entry_type).collect();
        assert!(types.contains(&EntryType::Decision));
        assert!(types.contains(&EntryType::Gotcha));
    }

    #[test]
    fn test_custom_scorer() {
        struct Flat;
        impl Scorer for Flat {
            fn score(&self, _candidate: &Candidate) -> f64 {
                0.42
            }
        }

        let msg = message(
            Role::Assistant,
            vec![ContentBlock::Text(
                "Be careful with the lock ordering in the importer.".to_string(),
            )],
        );
        let entries = PatternStrategy::new()
            .with_scorer(Box::new(Flat))
            .extract(&msg)
            .unwrap();
        assert!(entries.iter().all(|e| e.confidence == 0.42));
        assert!(!entries.is_empty());
    }
}
