//! Additive relevance scoring

use recollect_core::{Entry, EntryType};
use recollect_store::IndexHit;
use std::cmp::Ordering;

/// Phrases that mark an entry as explaining itself
const CONNECTIVES: &[&str] = &["provides", "enables", "because", "better than"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// General search: includes the index's own relevance
    Search,
    /// "Why" questions: adds a per-type priority instead
    Why,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    pub keyword: f64,
    pub reasoning_per_char: f64,
    pub reasoning_cap: f64,
    pub tag: f64,
    pub connective: f64,
    pub base: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            keyword: 1.0,
            reasoning_per_char: 0.01,
            reasoning_cap: 2.0,
            tag: 0.5,
            connective: 1.0,
            base: 1.0,
        }
    }
}

/// Type priority for "why" ranking: decisions answer why best
fn type_priority(entry_type: EntryType) -> f64 {
    match entry_type {
        EntryType::Decision => 3.0,
        EntryType::Gotcha => 2.5,
        EntryType::Discovery => 2.0,
        EntryType::Note => 1.5,
        EntryType::Summary => 1.0,
        EntryType::Preference => 0.5,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub keyword: f64,
    pub reasoning: f64,
    pub tags: f64,
    pub connective: f64,
    pub base: f64,
    pub type_priority: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.keyword + self.reasoning + self.tags + self.connective + self.base + self.type_priority
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub entry: Entry,
    pub score: ScoreBreakdown,
}

/// Lowercased, de-duplicated query terms; hyphens and punctuation separate terms
pub fn keywords(query: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in query.split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '/'))) {
        let term = raw.trim_matches(['.', '/']).to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    weights: Weights,
}

impl Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn score(&self, entry: &Entry, terms: &[String], base: f64, mode: Mode) -> ScoreBreakdown {
        let w = &self.weights;
        let text = entry.searchable_text().to_lowercase();

        let occurrences: usize = terms.iter().map(|t| text.matches(t.as_str()).count()).sum();
        let reasoning = (entry.reasoning_len() as f64 * w.reasoning_per_char).min(w.reasoning_cap);
        let connective = if CONNECTIVES.iter().any(|c| text.contains(c)) {
            w.connective
        } else {
            0.0
        };

        ScoreBreakdown {
            keyword: occurrences as f64 * w.keyword,
            reasoning,
            tags: entry.tags.len() as f64 * w.tag,
            connective,
            base: match mode {
                Mode::Search => base.max(0.0) * w.base,
                Mode::Why => 0.0,
            },
            type_priority: match mode {
                Mode::Search => 0.0,
                Mode::Why => type_priority(entry.entry_type),
            },
        }
    }

    /// Score and order hits: total descending, then newest, then id
    pub fn rank(&self, hits: Vec<IndexHit>, terms: &[String], mode: Mode) -> Vec<Ranked> {
        let mut ranked: Vec<Ranked> = hits
            .into_iter()
            .map(|hit| Ranked {
                score: self.score(&hit.entry, terms, hit.relevance, mode),
                entry: hit.entry,
            })
            .collect();
        ranked.sort_by(compare);
        ranked
    }
}

fn compare(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .total()
        .total_cmp(&a.score.total())
        .then_with(|| b.entry.timestamp.cmp(&a.entry.timestamp))
        .then_with(|| a.entry.id.cmp(&b.entry.id))
}
