//! Entry rows with their tag and file associations

use crate::error::{Result, StoreError};
use crate::retry::with_busy_retry;
use crate::store::{ts_from_sql, ts_to_sql, Store};
use chrono::{DateTime, Utc};
use recollect_core::{dedup_key, Entry, EntryType, NewEntry};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

pub(crate) const ENTRY_COLUMNS: &str =
    "e.id, e.type, e.content, e.reasoning, e.timestamp, e.branch, e.commit_hash, e.metadata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(String),
    /// Same (type, normalized content) already stored; nothing written
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub entry_type: Option<EntryType>,
    pub tag: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl EntryFilter {
    /// Newest entries recorded in the last `days` days
    pub fn recent(days: u32, limit: usize) -> Self {
        Self {
            since: Some(Utc::now() - chrono::Duration::days(i64::from(days))),
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub content: Option<String>,
    /// `Some(None)` clears the reasoning
    pub reasoning: Option<Option<String>>,
    pub entry_type: Option<EntryType>,
    /// Replaces the whole tag set
    pub tags: Option<Vec<String>>,
}

pub(crate) fn insert(conn: &Connection, entry: &NewEntry) -> Result<InsertOutcome> {
    let id = uuid::Uuid::new_v4().to_string();
    let key = dedup_key(entry.entry_type, &entry.content);
    let changed = conn.execute(
        "INSERT OR IGNORE INTO entries
            (id, type, content, reasoning, timestamp, branch, commit_hash, metadata, content_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            entry.entry_type.as_str(),
            entry.content,
            entry.reasoning,
            ts_to_sql(&entry.timestamp),
            entry.branch,
            entry.commit_hash,
            serde_json::to_string(&entry.metadata)?,
            key,
        ],
    )?;
    if changed == 0 {
        tracing::debug!(entry_type = %entry.entry_type, "skipping duplicate entry");
        return Ok(InsertOutcome::Duplicate);
    }

    for tag in &entry.tags {
        conn.execute(
            "INSERT OR IGNORE INTO tags (entry_id, tag) VALUES (?1, ?2)",
            params![id, tag],
        )?;
    }
    for file in &entry.files {
        conn.execute(
            "INSERT OR IGNORE INTO files (entry_id, file_path) VALUES (?1, ?2)",
            params![id, file],
        )?;
    }
    Ok(InsertOutcome::Inserted(id))
}

pub(crate) fn contains_key(conn: &Connection, key: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM entries WHERE content_hash = ?1",
            params![key],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn row_to_entry(row: &Row) -> rusqlite::Result<Entry> {
    let entry_type: String = row.get(1)?;
    let entry_type = entry_type
        .parse::<EntryType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let timestamp: String = row.get(4)?;
    let metadata: String = row.get(7)?;
    let metadata = serde_json::from_str(&metadata)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Entry {
        id: row.get(0)?,
        entry_type,
        content: row.get(2)?,
        reasoning: row.get(3)?,
        timestamp: ts_from_sql(4, &timestamp)?,
        branch: row.get(5)?,
        commit_hash: row.get(6)?,
        metadata,
        tags: Vec::new(),
        files: Vec::new(),
    })
}

/// Run an entry query and attach each row's tags and files
pub(crate) fn query_entries(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<Entry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_entry)?;
    let mut entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;

    let mut tags = conn.prepare_cached("SELECT tag FROM tags WHERE entry_id = ?1 ORDER BY tag")?;
    let mut files =
        conn.prepare_cached("SELECT file_path FROM files WHERE entry_id = ?1 ORDER BY file_path")?;
    for entry in &mut entries {
        entry.tags = tags
            .query_map(params![entry.id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        entry.files = files
            .query_map(params![entry.id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
    }
    Ok(entries)
}

pub(crate) fn get(conn: &Connection, id: &str) -> Result<Option<Entry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries e WHERE e.id = ?1");
    Ok(query_entries(conn, &sql, &[&id])?.into_iter().next())
}

pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Store {
    pub fn insert_entry(&mut self, entry: &NewEntry) -> Result<InsertOutcome> {
        let tx = self.transaction()?;
        let outcome = tx.insert_entry(entry)?;
        tx.commit()?;
        Ok(outcome)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        with_busy_retry(|| contains_key(self.conn(), key))
    }

    pub fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        with_busy_retry(|| get(self.conn(), id))
    }

    /// Look up by full id, falling back to a unique id prefix
    pub fn find_entry(&self, id_or_prefix: &str) -> Result<Option<Entry>> {
        if let Some(entry) = self.get_entry(id_or_prefix)? {
            return Ok(Some(entry));
        }
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries e WHERE e.id LIKE ?1 ESCAPE '\\' LIMIT 2"
        );
        let pattern = format!("{}%", escape_like(id_or_prefix));
        let mut found = with_busy_retry(|| query_entries(self.conn(), &sql, &[&pattern]))?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(StoreError::Ambiguous(id_or_prefix.to_string())),
        }
    }

    /// Entries matching `filter`, newest first
    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries e
             WHERE (?1 IS NULL OR e.type = ?1)
               AND (?2 IS NULL OR EXISTS (SELECT 1 FROM tags t WHERE t.entry_id = e.id AND t.tag = ?2))
               AND (?3 IS NULL OR e.timestamp >= ?3)
             ORDER BY e.timestamp DESC, e.id ASC
             LIMIT ?4"
        );
        let entry_type = filter.entry_type.map(|t| t.as_str());
        let since = filter.since.as_ref().map(ts_to_sql);
        let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
        with_busy_retry(|| {
            query_entries(
                self.conn(),
                &sql,
                &[&entry_type, &filter.tag, &since, &limit],
            )
        })
    }

    pub fn last_entry(&self) -> Result<Option<Entry>> {
        let filter = EntryFilter {
            limit: Some(1),
            ..EntryFilter::default()
        };
        Ok(self.list_entries(&filter)?.into_iter().next())
    }

    /// Apply `update` and re-key the entry; the index follows via trigger
    pub fn update_entry(&mut self, id: &str, update: &EntryUpdate) -> Result<Entry> {
        let tx = self.transaction()?;
        let conn: &Connection = tx.connection();
        let current = get(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let entry_type = update.entry_type.unwrap_or(current.entry_type);
        let content = update.content.clone().unwrap_or(current.content);
        let reasoning = update.reasoning.clone().unwrap_or(current.reasoning);
        let key = dedup_key(entry_type, &content);

        let clash: Option<String> = conn
            .query_row(
                "SELECT id FROM entries WHERE content_hash = ?1 AND id != ?2",
                params![key, id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(other) = clash {
            return Err(StoreError::Duplicate(other));
        }

        conn.execute(
            "UPDATE entries SET type = ?1, content = ?2, reasoning = ?3, content_hash = ?4
             WHERE id = ?5",
            params![entry_type.as_str(), content, reasoning, key, id],
        )?;
        if let Some(tags) = &update.tags {
            conn.execute("DELETE FROM tags WHERE entry_id = ?1", params![id])?;
            for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                conn.execute(
                    "INSERT OR IGNORE INTO tags (entry_id, tag) VALUES (?1, ?2)",
                    params![id, tag],
                )?;
            }
        }
        let updated = get(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        tx.commit()?;
        Ok(updated)
    }

    /// Delete one entry; tags, files and its index row go with it
    pub fn delete_entry(&mut self, id: &str) -> Result<bool> {
        let tx = self.transaction()?;
        let removed = tx
            .connection()
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn delete_by_type(&mut self, entry_type: EntryType) -> Result<usize> {
        let tx = self.transaction()?;
        let removed = tx.connection().execute(
            "DELETE FROM entries WHERE type = ?1",
            params![entry_type.as_str()],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn delete_before(&mut self, cutoff: DateTime<Utc>) -> Result<usize> {
        let tx = self.transaction()?;
        let removed = tx.connection().execute(
            "DELETE FROM entries WHERE timestamp < ?1",
            params![ts_to_sql(&cutoff)],
        )?;
        tx.commit()?;
        Ok(removed)
    }
}
