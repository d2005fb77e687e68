use super::decision::decision_re;
use super::{causal_re, compile, split_reason, Candidate, MatchContext};
use crate::scoring::Signal;
use crate::sentence::is_quality_sentence;
use recollect_core::EntryType;
use regex::Regex;
use std::sync::OnceLock;

static DISCOVERY_RE: OnceLock<Regex> = OnceLock::new();

fn discovery_re() -> &'static Regex {
    DISCOVERY_RE.get_or_init(|| {
        compile(
            r"(?i)\b(the (problem|issue|bug|culprit) (was|is)|root cause|discovered that|turns out|turned out|found that|the fix (was|is)|realized that|learned that)\b",
        )
    })
}

/// Root causes and findings, plus causal explanations outside decisions
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    let mut out = Vec::new();
    for sentence in &ctx.sentences {
        if !is_quality_sentence(sentence) {
            continue;
        }
        if discovery_re().is_match(sentence) {
            let trimmed = sentence.trim_end_matches('.');
            out.push(Candidate::new(EntryType::Discovery, trimmed, Signal::Strong));
            continue;
        }
        if decision_re().is_match(sentence) || !causal_re().is_match(sentence) {
            continue;
        }
        if let Some((claim, reason)) = split_reason(sentence, 0) {
            out.push(
                Candidate::new(EntryType::Discovery, claim, Signal::Keyword)
                    .with_reasoning(Some(reason)),
            );
        }
    }
    out
}
