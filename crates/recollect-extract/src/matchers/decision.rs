use super::{compile, split_reason, Candidate, MatchContext};
use crate::scoring::Signal;
use crate::sentence::is_quality_sentence;
use recollect_core::EntryType;
use regex::Regex;
use std::sync::OnceLock;

static DECISION_RE: OnceLock<Regex> = OnceLock::new();

pub(super) fn decision_re() -> &'static Regex {
    DECISION_RE.get_or_init(|| {
        compile(
            r"(?i)\b(decided to|decided on|chose to|chose|went with|opted for|opted to|settled on|switched to|let['’]s use|let['’]s go with|we['’]ll use|we will use|using)\b",
        )
    })
}

/// Decision phrasing, with the reason split off at the causal connective
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    let mut out = Vec::new();
    for sentence in &ctx.sentences {
        let Some(verb) = decision_re().find(sentence) else {
            continue;
        };
        if !is_quality_sentence(sentence) {
            continue;
        }
        // bare "using" is too common to count without a stated reason
        let implicit = verb.as_str().eq_ignore_ascii_case("using");

        match split_reason(sentence, verb.end()) {
            Some((claim, reason)) => out.push(
                Candidate::new(EntryType::Decision, claim, Signal::Explicit)
                    .with_reasoning(Some(reason)),
            ),
            None if !implicit => {
                out.push(Candidate::new(
                    EntryType::Decision,
                    sentence.trim_end_matches('.'),
                    Signal::Strong,
                ));
            }
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recollect_transcript::{ContentBlock, Message, Role};

    fn run(text: &str) -> Vec<Candidate> {
        let message = Message {
            line: 1,
            id: None,
            parent_id: None,
            session_id: None,
            role: Role::User,
            blocks: vec![ContentBlock::Text(text.to_string())],
            timestamp: Utc::now(),
        };
        extract(&MatchContext::new(&message, 80))
    }

    #[test]
    fn test_decision_with_reason() {
        let found = run("Let's use PostgreSQL because we need ACID guarantees");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "Let's use PostgreSQL");
        assert_eq!(found[0].reasoning.as_deref(), Some("we need ACID guarantees"));
        assert_eq!(found[0].signal, Signal::Explicit);
    }

    #[test]
    fn test_decision_without_reason() {
        let found = run("We decided to keep the parser single threaded for now.");
        assert_eq!(found.len(), 1);
        assert!(found[0].reasoning.is_none());
        assert_eq!(found[0].signal, Signal::Strong);
    }

    #[test]
    fn test_bare_using_requires_reason() {
        assert!(run("I am using the debugger to step through this").is_empty());
        let found = run("We are using rusqlite since it bundles SQLite with FTS5");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reasoning.as_deref(), Some("it bundles SQLite with FTS5"));
    }

    #[test]
    fn test_low_quality_sentences_skipped() {
        assert!(run("chose X").is_empty());
        assert!(run("$ git checkout -b decided-to-use-branch now please").is_empty());
    }
}
