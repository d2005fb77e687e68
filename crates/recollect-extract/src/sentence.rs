//! Sentence splitting and the quality gate shared by phrase matchers

const MIN_CHARS: usize = 20;
const MAX_CHARS: usize = 500;
const MIN_WORDS: usize = 4;
const MAX_SPECIAL_RATIO: f64 = 0.3;
const COMMAND_PREFIXES: &[&str] = &["$", ">", "npm ", "cd ", "ls ", "git "];

/// Split on line breaks and on `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            push_sentence(&mut sentences, &mut current);
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            push_sentence(&mut sentences, &mut current);
        }
    }
    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

/// Reject fragments that look like code, commands or serialized data
pub fn is_quality_sentence(sentence: &str) -> bool {
    let len = sentence.chars().count();
    if !(MIN_CHARS..=MAX_CHARS).contains(&len) {
        return false;
    }
    if sentence.split_whitespace().count() < MIN_WORDS {
        return false;
    }

    let special = sentence
        .chars()
        .filter(|c| !c.is_alphanumeric() && *c != ' ')
        .count();
    if special as f64 / len as f64 > MAX_SPECIAL_RATIO {
        return false;
    }

    let trimmed = sentence.trim_start();
    if COMMAND_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return false;
    }
    if sentence.contains('{') && sentence.contains('}') && sentence.contains('"') {
        return false;
    }
    !(sentence.contains("\\n") || sentence.contains("\\t"))
}

/// Truncate to at most `max` chars on a char boundary
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_terminators_and_newlines() {
        let text = "We chose SQLite. It is embedded!\n- Watch out for locks? Yes\nsrc/lib.rs stays";
        assert_eq!(
            split_sentences(text),
            vec![
                "We chose SQLite.",
                "It is embedded!",
                "Watch out for locks?",
                "Yes",
                "src/lib.rs stays"
            ]
        );
    }

    #[test]
    fn test_quality_gate() {
        assert!(is_quality_sentence("Let's use PostgreSQL because we need ACID guarantees"));
        assert!(!is_quality_sentence("too short here"));
        assert!(!is_quality_sentence("$ cargo build --release --all-features"));
        assert!(!is_quality_sentence(r#"decided to set {"key": "value"} in config"#));
        assert!(!is_quality_sentence("decided to escape \\n sequences in the output"));
        assert!(!is_quality_sentence("::<>::<>::<>::<>::<> a b c d"));
        assert!(!is_quality_sentence(&"word ".repeat(120)));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
