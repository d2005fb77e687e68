use crate::ranker::{keywords, Mode, Ranked, Ranker};
use recollect_core::EntryType;
use recollect_store::{Result, Store};

/// Question words dropped from "why" queries before matching
const QUESTION_WORDS: &[&str] = &[
    "why", "what", "how", "did", "do", "does", "we", "i", "is", "are", "was", "were", "the", "a",
    "an", "to", "of",
];

/// Ranked entries for a free-text query, optionally restricted to one type
pub fn search(
    store: &Store,
    query: &str,
    entry_type: Option<EntryType>,
    limit: usize,
) -> Result<Vec<Ranked>> {
    let hits = store.search_index(query, entry_type)?;
    let mut ranked = Ranker::new().rank(hits, &keywords(query), Mode::Search);
    ranked.truncate(limit);
    tracing::debug!(query, results = ranked.len(), "search");
    Ok(ranked)
}

/// Terms of a "why" question, without the question words
pub fn why_keywords(query: &str) -> Vec<String> {
    let all = keywords(query);
    let filtered: Vec<String> = all
        .iter()
        .filter(|k| !QUESTION_WORDS.contains(&k.as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() {
        all
    } else {
        filtered
    }
}

/// Entries answering "why", decisions and constraints first
pub fn why(store: &Store, query: &str, limit: usize) -> Result<Vec<Ranked>> {
    let terms = why_keywords(query);
    // quoted terms keep punctuation like `store.rs` out of the query syntax;
    // any term may match and the ranker rewards entries matching more of them
    let fts_query = terms
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ");
    let hits = store.search_index(&fts_query, None)?;
    let mut ranked = Ranker::new().rank(hits, &terms, Mode::Why);
    ranked.truncate(limit);
    tracing::debug!(query, results = ranked.len(), "why");
    Ok(ranked)
}
