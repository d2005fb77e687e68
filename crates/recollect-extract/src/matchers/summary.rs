use super::{compile, Candidate, MatchContext};
use crate::scoring::Signal;
use recollect_core::EntryType;
use recollect_transcript::Role;
use regex::Regex;
use std::sync::OnceLock;

const BOLD_LEVEL: usize = 7;
const PLAIN_LEVEL: usize = 8;

static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static PLAIN_TITLE_RE: OnceLock<Regex> = OnceLock::new();

const TITLES: &str = r"summary|key (decisions|takeaways|findings|points|learnings|changes)|lessons learned|root cause|conclusions?|changes made|recap|takeaways|tl;?dr|what (we|i) (learned|changed|found)";

fn title_re() -> &'static Regex {
    TITLE_RE.get_or_init(|| compile(&format!(r"(?i)\b({TITLES})\b")))
}

fn plain_title_re() -> &'static Regex {
    PLAIN_TITLE_RE.get_or_init(|| compile(&format!(r"(?i)^({TITLES})$")))
}

struct Header<'a> {
    level: usize,
    title: &'a str,
    /// Text following a `Title:` header on the same line
    inline: &'a str,
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        let rest = &trimmed[level..];
        if level <= 6 && rest.starts_with(' ') {
            let title = rest.trim().trim_end_matches('#').trim();
            return Some(Header {
                level,
                title,
                inline: "",
            });
        }
        return None;
    }
    if trimmed.len() > 4 && trimmed.starts_with("**") {
        let inner = trimmed.trim_end_matches(':').trim_end();
        if let Some(inner) = inner.strip_prefix("**").and_then(|s| s.strip_suffix("**")) {
            if !inner.contains("**") {
                return Some(Header {
                    level: BOLD_LEVEL,
                    title: inner.trim().trim_end_matches(':'),
                    inline: "",
                });
            }
        }
    }
    if let Some((head, rest)) = trimmed.split_once(':') {
        if plain_title_re().is_match(head.trim()) {
            return Some(Header {
                level: PLAIN_LEVEL,
                title: head.trim(),
                inline: rest.trim(),
            });
        }
    }
    None
}

/// Header-delimited synthesis blocks in assistant messages
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    if ctx.message.role != Role::Assistant {
        return Vec::new();
    }

    let lines: Vec<&str> = ctx.text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(header) = parse_header(lines[i]) else {
            i += 1;
            continue;
        };
        if !title_re().is_match(header.title) {
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < lines.len() {
            match parse_header(lines[end]) {
                Some(next) if next.level <= header.level => break,
                _ => end += 1,
            }
        }

        let mut body_lines = Vec::new();
        if !header.inline.is_empty() {
            body_lines.push(header.inline);
        }
        body_lines.extend_from_slice(&lines[i + 1..end]);
        let body = body_lines.join("\n");
        let body = body.trim();

        if body.chars().count() >= ctx.summary_min_chars {
            // stored whole, no length cap
            let content = format!("{}\n\n{}", header.title, body);
            out.push(Candidate::new(EntryType::Summary, content, Signal::Structured));
        }
        i = end;
    }
    out
}
