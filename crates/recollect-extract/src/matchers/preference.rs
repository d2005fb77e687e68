use super::{compile, Candidate, MatchContext};
use crate::scoring::Signal;
use crate::sentence::is_quality_sentence;
use recollect_core::EntryType;
use recollect_transcript::Role;
use regex::Regex;
use std::sync::OnceLock;

static PREFERENCE_RE: OnceLock<Regex> = OnceLock::new();

fn preference_re() -> &'static Regex {
    PREFERENCE_RE.get_or_init(|| {
        compile(
            r"(?i)\b(i prefer|we prefer|prefer to|i['’]d rather|i would rather|always use|never use|don['’]t ever|please always|please never|i like to|i want you to|style:|typically|usually)",
        )
    })
}

/// Stated preferences; only the user can state them
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    if ctx.message.role != Role::User {
        return Vec::new();
    }
    ctx.sentences
        .iter()
        .filter(|s| preference_re().is_match(s) && is_quality_sentence(s))
        .map(|s| Candidate::new(EntryType::Preference, s.as_str(), Signal::Keyword))
        .collect()
}
