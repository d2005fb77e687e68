use super::{compile, Candidate, MatchContext};
use crate::scoring::Signal;
use crate::sentence::is_quality_sentence;
use recollect_core::EntryType;
use regex::Regex;
use std::sync::OnceLock;

static GOTCHA_RE: OnceLock<Regex> = OnceLock::new();

fn gotcha_re() -> &'static Regex {
    GOTCHA_RE.get_or_init(|| {
        compile(
            r"(?i)\b(watch out for|gotchas?|be careful|limitations?|caveats?|pitfalls?|tricky|important to note|constraint|failed because|(doesn['’]t|does not|won['’]t|will not) work (if|when|with|unless)|requires that|must not|make sure to)\b",
        )
    })
}

/// Warnings and constraints, one candidate per qualifying sentence
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    ctx.sentences
        .iter()
        .filter(|s| gotcha_re().is_match(s) && is_quality_sentence(s))
        .filter(|s| seen.insert(recollect_core::normalize_content(s)))
        .map(|s| Candidate::new(EntryType::Gotcha, s.as_str(), Signal::Explicit))
        .collect()
}
