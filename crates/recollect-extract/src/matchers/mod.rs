//! Independent matchers, each mapping one message to zero or more candidates

mod decision;
mod discovery;
mod gotcha;
mod preference;
mod summary;
mod tool_failure;

use crate::scoring::Signal;
use crate::sentence::split_sentences;
use recollect_core::EntryType;
use recollect_transcript::Message;
use regex::Regex;

/// Matcher output before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entry_type: EntryType,
    pub content: String,
    pub reasoning: Option<String>,
    pub signal: Signal,
}

impl Candidate {
    pub fn new(entry_type: EntryType, content: impl Into<String>, signal: Signal) -> Self {
        Self {
            entry_type,
            content: content.into(),
            reasoning: None,
            signal,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }
}

/// Normalized view of one message shared by all matchers
pub struct MatchContext<'a> {
    pub message: &'a Message,
    pub text: String,
    pub sentences: Vec<String>,
    pub summary_min_chars: usize,
}

impl<'a> MatchContext<'a> {
    pub fn new(message: &'a Message, summary_min_chars: usize) -> Self {
        let text = message.text();
        let sentences = split_sentences(&text);
        Self {
            message,
            text,
            sentences,
            summary_min_chars,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    ToolFailure,
    Decision,
    Gotcha,
    Preference,
    Discovery,
    Summary,
}

impl MatcherKind {
    /// Tool failures come first: they fire on messages with no visible text
    pub const ALL: [MatcherKind; 6] = [
        MatcherKind::ToolFailure,
        MatcherKind::Decision,
        MatcherKind::Gotcha,
        MatcherKind::Preference,
        MatcherKind::Discovery,
        MatcherKind::Summary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MatcherKind::ToolFailure => "tool_failure",
            MatcherKind::Decision => "decision",
            MatcherKind::Gotcha => "gotcha",
            MatcherKind::Preference => "preference",
            MatcherKind::Discovery => "discovery",
            MatcherKind::Summary => "summary",
        }
    }

    /// Whether the matcher can fire on a message with no text blocks
    pub fn needs_text(&self) -> bool {
        !matches!(self, MatcherKind::ToolFailure)
    }

    pub fn run(&self, ctx: &MatchContext<'_>) -> Vec<Candidate> {
        match self {
            MatcherKind::ToolFailure => tool_failure::extract(ctx),
            MatcherKind::Decision => decision::extract(ctx),
            MatcherKind::Gotcha => gotcha::extract(ctx),
            MatcherKind::Preference => preference::extract(ctx),
            MatcherKind::Discovery => discovery::extract(ctx),
            MatcherKind::Summary => summary::extract(ctx),
        }
    }
}

/// Compile a static pattern; patterns are literals covered by tests
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid matcher pattern {pattern:?}: {e}"))
}

/// Causal connective that separates a claim from its reason
fn causal_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\b(because|since|so that|due to)\b"))
}

/// Split a sentence at the first causal connective after `from`
fn split_reason(sentence: &str, from: usize) -> Option<(String, String)> {
    let m = causal_re().find_at(sentence, from)?;
    let claim = sentence[..m.start()]
        .trim()
        .trim_end_matches([',', ';', ' ']);
    let reason = sentence[m.end()..]
        .trim()
        .trim_end_matches(['.', '!', '?']);
    // reasons shorter than a few words are noise ("since then")
    if claim.is_empty() || reason.chars().count() < 10 {
        return None;
    }
    Some((claim.to_string(), reason.to_string()))
}
