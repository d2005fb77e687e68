//! Unfiltered raw message archive

use crate::error::Result;
use crate::retry::with_busy_retry;
use crate::store::{ts_from_sql, ts_to_sql, Store};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

/// One transcript line as it was read, with its noise label
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub transcript: String,
    pub line: usize,
    pub message_id: Option<String>,
    pub parent_id: Option<String>,
    pub session_id: Option<String>,
    pub role: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub noise: String,
    pub raw_json: String,
}

/// Archive rows; lines already archived for the same transcript are skipped
pub(crate) fn insert(conn: &Connection, rows: &[RawMessage]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO raw_messages
            (transcript, line, message_id, parent_id, session_id, role, timestamp, text, noise, raw_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    let mut inserted = 0;
    for row in rows {
        inserted += stmt.execute(params![
            row.transcript,
            row.line as i64,
            row.message_id,
            row.parent_id,
            row.session_id,
            row.role,
            ts_to_sql(&row.timestamp),
            row.text,
            row.noise,
            row.raw_json,
        ])?;
    }
    Ok(inserted)
}

const RAW_COLUMNS: &str =
    "transcript, line, message_id, parent_id, session_id, role, timestamp, text, noise, raw_json";

fn row_to_raw(row: &Row) -> rusqlite::Result<RawMessage> {
    let timestamp: String = row.get(6)?;
    Ok(RawMessage {
        transcript: row.get(0)?,
        line: row.get::<_, i64>(1)? as usize,
        message_id: row.get(2)?,
        parent_id: row.get(3)?,
        session_id: row.get(4)?,
        role: row.get(5)?,
        timestamp: ts_from_sql(6, &timestamp)?,
        text: row.get(7)?,
        noise: row.get(8)?,
        raw_json: row.get(9)?,
    })
}

impl Store {
    /// Archived lines of one transcript in file order
    pub fn raw_messages(&self, transcript: &str) -> Result<Vec<RawMessage>> {
        with_busy_retry(|| {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {RAW_COLUMNS} FROM raw_messages WHERE transcript = ?1 ORDER BY line"
            ))?;
            let rows = stmt.query_map(params![transcript], row_to_raw)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Archived lines of one assistant session in time order
    pub fn raw_messages_for_session(&self, session_id: &str) -> Result<Vec<RawMessage>> {
        with_busy_retry(|| {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {RAW_COLUMNS} FROM raw_messages WHERE session_id = ?1 ORDER BY timestamp, line"
            ))?;
            let rows = stmt.query_map(params![session_id], row_to_raw)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: usize, text: &str) -> RawMessage {
        RawMessage {
            transcript: "/t/a.jsonl".to_string(),
            line,
            message_id: Some(format!("m{}", line)),
            parent_id: None,
            session_id: Some("s1".to_string()),
            role: "user".to_string(),
            timestamp: Utc::now(),
            text: text.to_string(),
            noise: "signal".to_string(),
            raw_json: "{}".to_string(),
        }
    }

    #[test]
    fn test_archive_skips_already_archived_lines() {
        let mut store = Store::open_in_memory().unwrap();
        let tx = store.transaction().unwrap();
        assert_eq!(tx.archive(&[raw(1, "hello"), raw(2, "ok")]).unwrap(), 2);
        assert_eq!(tx.archive(&[raw(2, "ok"), raw(3, "more")]).unwrap(), 1);
        tx.commit().unwrap();

        let lines = store.raw_messages("/t/a.jsonl").unwrap();
        assert_eq!(lines.iter().map(|r| r.line).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(store.raw_messages_for_session("s1").unwrap().len(), 3);
        assert_eq!(store.counts().unwrap().raw_messages, 3);
    }
}
