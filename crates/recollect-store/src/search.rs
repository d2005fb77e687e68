//! Full-text lookup with query-syntax fallbacks

use crate::entries::{escape_like, get, query_entries, ENTRY_COLUMNS};
use crate::error::Result;
use crate::retry::{is_busy, with_busy_retry};
use crate::store::Store;
use crate::EntryFilter;
use recollect_core::{Entry, EntryType};
use rusqlite::{params, Connection, ToSql};

/// An entry matched by the index, with the index's own relevance
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub entry: Entry,
    /// Negated BM25 score; higher is better, zero for substring matches
    pub relevance: f64,
}

impl Store {
    /// Candidate entries for `query`, never failing on query syntax
    ///
    /// The raw query goes to FTS5 first. When FTS5 rejects it, hyphens are
    /// replaced by spaces and the query is retried once; if that is rejected
    /// too, every whitespace-separated keyword must appear as a substring of
    /// content or reasoning. An empty query matches every entry.
    pub fn search_index(&self, query: &str, entry_type: Option<EntryType>) -> Result<Vec<IndexHit>> {
        let query = query.trim();
        if query.is_empty() {
            let entries = self.list_entries(&EntryFilter {
                entry_type,
                ..EntryFilter::default()
            })?;
            return Ok(entries
                .into_iter()
                .map(|entry| IndexHit {
                    entry,
                    relevance: 0.0,
                })
                .collect());
        }
        with_busy_retry(|| search_chain(self.conn(), query, entry_type))
    }
}

fn search_chain(conn: &Connection, query: &str, entry_type: Option<EntryType>) -> Result<Vec<IndexHit>> {
    let ranked = match fts_ids(conn, query, entry_type) {
        Ok(ranked) => Some(ranked),
        Err(e) if is_busy(&e) => return Err(e.into()),
        Err(e) => {
            tracing::debug!(query, error = %e, "index rejected query");
            None
        }
    };

    let ranked = match ranked {
        Some(ranked) => Some(ranked),
        None if query.contains('-') => {
            let normalized = query.replace('-', " ");
            match fts_ids(conn, &normalized, entry_type) {
                Ok(ranked) => Some(ranked),
                Err(e) if is_busy(&e) => return Err(e.into()),
                Err(e) => {
                    tracing::debug!(query = %normalized, error = %e, "index rejected normalized query");
                    None
                }
            }
        }
        None => None,
    };

    match ranked {
        Some(ranked) => {
            let mut hits = Vec::with_capacity(ranked.len());
            for (id, score) in ranked {
                if let Some(entry) = get(conn, &id)? {
                    hits.push(IndexHit {
                        entry,
                        relevance: -score,
                    });
                }
            }
            Ok(hits)
        }
        None => {
            tracing::info!(query, "falling back to substring scan");
            substring_scan(conn, query, entry_type)
        }
    }
}

/// Matching entry ids with their BM25 score, best first
fn fts_ids(
    conn: &Connection,
    query: &str,
    entry_type: Option<EntryType>,
) -> rusqlite::Result<Vec<(String, f64)>> {
    let mut stmt = conn.prepare(
        "SELECT f.entry_id, bm25(entries_fts, 0.0, 1.0, 0.75) AS score
         FROM entries_fts f
         JOIN entries e ON e.id = f.entry_id
         WHERE entries_fts MATCH ?1 AND (?2 IS NULL OR e.type = ?2)
         ORDER BY score, e.id",
    )?;
    let rows = stmt.query_map(params![query, entry_type.map(|t| t.as_str())], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;
    rows.collect()
}

/// Keywords are the word-like runs of the query; all must appear
fn substring_scan(
    conn: &Connection,
    query: &str,
    entry_type: Option<EntryType>,
) -> Result<Vec<IndexHit>> {
    let keywords: Vec<String> = query
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '/')))
        .filter(|k| !k.is_empty())
        .map(|k| format!("%{}%", escape_like(&k.to_lowercase())))
        .collect();
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries e WHERE (?1 IS NULL OR e.type = ?1)");
    for i in 0..keywords.len() {
        let n = i + 2;
        sql.push_str(&format!(
            " AND (lower(e.content) LIKE ?{n} ESCAPE '\\' OR lower(COALESCE(e.reasoning, '')) LIKE ?{n} ESCAPE '\\')"
        ));
    }
    sql.push_str(" ORDER BY e.timestamp DESC, e.id ASC");

    let type_param = entry_type.map(|t| t.as_str());
    let mut bound: Vec<&dyn ToSql> = vec![&type_param];
    bound.extend(keywords.iter().map(|k| k as &dyn ToSql));

    Ok(query_entries(conn, &sql, &bound)?
        .into_iter()
        .map(|entry| IndexHit {
            entry,
            relevance: 0.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_core::NewEntry;

    fn seeded() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store
            .insert_entry(
                &NewEntry::new(EntryType::Decision, "Enable auto attachment of context files")
                    .with_reasoning("users forget to attach files"),
            )
            .unwrap();
        store
            .insert_entry(&NewEntry::new(EntryType::Gotcha, "Attachment uploads time out over VPN"))
            .unwrap();
        store
            .insert_entry(&NewEntry::new(EntryType::Note, "Unrelated note about logging"))
            .unwrap();
        store
    }

    fn contents(hits: &[IndexHit]) -> Vec<String> {
        let mut c: Vec<_> = hits.iter().map(|h| h.entry.content.clone()).collect();
        c.sort();
        c
    }

    #[test]
    fn test_basic_match_and_type_filter() {
        let store = seeded();
        let hits = store.search_index("attachment", None).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.relevance > 0.0));

        let gotchas = store.search_index("attachment", Some(EntryType::Gotcha)).unwrap();
        assert_eq!(gotchas.len(), 1);
    }

    #[test]
    fn test_hyphenated_query_matches_spaced_query() {
        let store = seeded();
        let hyphen = store.search_index("auto-attachment", None).unwrap();
        let spaced = store.search_index("auto attachment", None).unwrap();
        assert_eq!(contents(&hyphen), contents(&spaced));
        assert_eq!(hyphen.len(), 1);
    }

    #[test]
    fn test_reasoning_is_indexed() {
        let store = seeded();
        let hits = store.search_index("forget", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.entry_type, EntryType::Decision);
    }

    #[test]
    fn test_unparseable_query_falls_back_to_substring() {
        let store = seeded();
        let hits = store.search_index("logging\"", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance, 0.0);
        assert!(store.search_index("((", None).unwrap().is_empty());
    }

    #[test]
    fn test_empty_query_lists_everything() {
        let store = seeded();
        assert_eq!(store.search_index("  ", None).unwrap().len(), 3);
    }

    #[test]
    fn test_index_follows_updates_and_deletes() {
        let mut store = seeded();
        let id = store.search_index("logging", None).unwrap()[0].entry.id.clone();
        store
            .update_entry(
                &id,
                &crate::EntryUpdate {
                    content: Some("Note about tracing spans".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.search_index("logging", None).unwrap().is_empty());
        assert_eq!(store.search_index("tracing", None).unwrap().len(), 1);

        store.delete_entry(&id).unwrap();
        assert!(store.search_index("tracing", None).unwrap().is_empty());
    }
}
