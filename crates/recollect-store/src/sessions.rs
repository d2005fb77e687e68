//! Recorded coding sessions

use crate::error::{Result, StoreError};
use crate::retry::with_busy_retry;
use crate::store::{ts_from_sql, ts_to_sql, Store};
use chrono::Utc;
use recollect_core::{EntryType, NewSession, Session};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const SESSION_COLUMNS: &str =
    "id, start_time, end_time, duration_minutes, summary, branch, reason";

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    let start: String = row.get(1)?;
    let end: String = row.get(2)?;
    Ok(Session {
        id: row.get(0)?,
        start_time: ts_from_sql(1, &start)?,
        end_time: ts_from_sql(2, &end)?,
        duration_minutes: row.get(3)?,
        summary: row.get(4)?,
        branch: row.get(5)?,
        reason: row.get(6)?,
        files: Vec::new(),
        commands: Vec::new(),
        entry_counts: BTreeMap::new(),
        user_requests: Vec::new(),
    })
}

fn load_sessions(conn: &Connection, sql: &str, param: &dyn rusqlite::ToSql) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(sql)?;
    let mut sessions = stmt
        .query_map(&[param], row_to_session)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for session in &mut sessions {
        let mut files = conn.prepare_cached(
            "SELECT file_path FROM session_files WHERE session_id = ?1 ORDER BY file_path",
        )?;
        session.files = files
            .query_map(params![session.id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut commands = conn
            .prepare_cached("SELECT command FROM session_commands WHERE session_id = ?1 ORDER BY id")?;
        session.commands = commands
            .query_map(params![session.id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut requests = conn.prepare_cached(
            "SELECT request FROM session_user_requests WHERE session_id = ?1 ORDER BY id",
        )?;
        session.user_requests = requests
            .query_map(params![session.id], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut counts = conn.prepare_cached(
            "SELECT entry_type, count FROM session_entry_counts WHERE session_id = ?1",
        )?;
        let rows = counts.query_map(params![session.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (entry_type, count) = row?;
            if let Ok(entry_type) = entry_type.parse::<EntryType>() {
                session.entry_counts.insert(entry_type, count as usize);
            }
        }
    }
    Ok(sessions)
}

impl Store {
    pub fn add_session(&mut self, new: &NewSession) -> Result<Session> {
        let id = new
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let end = new.end_time.unwrap_or_else(Utc::now);
        let start = new.start_time.unwrap_or(end);
        let duration = (end - start).num_minutes().max(0);

        let tx = self.transaction()?;
        let conn = tx.connection();
        conn.execute(
            "INSERT INTO sessions (id, start_time, end_time, duration_minutes, summary, branch, reason)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                ts_to_sql(&start),
                ts_to_sql(&end),
                duration,
                new.summary,
                new.branch,
                new.reason,
            ],
        )?;
        for file in &new.files {
            conn.execute(
                "INSERT OR IGNORE INTO session_files (session_id, file_path) VALUES (?1, ?2)",
                params![id, file],
            )?;
        }
        for command in &new.commands {
            conn.execute(
                "INSERT INTO session_commands (session_id, command) VALUES (?1, ?2)",
                params![id, command],
            )?;
        }
        for (entry_type, count) in &new.entry_counts {
            conn.execute(
                "INSERT INTO session_entry_counts (session_id, entry_type, count) VALUES (?1, ?2, ?3)",
                params![id, entry_type.as_str(), *count as i64],
            )?;
        }
        for request in &new.user_requests {
            conn.execute(
                "INSERT INTO session_user_requests (session_id, request) VALUES (?1, ?2)",
                params![id, request],
            )?;
        }
        tx.commit()?;

        tracing::info!(session = %id, duration, "recorded session");
        self.get_session(&id)?
            .ok_or_else(|| StoreError::NotFound(format!("session {}", id)))
    }

    /// Sessions, most recently ended first
    pub fn list_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY end_time DESC, id LIMIT ?1"
        );
        let limit = limit as i64;
        with_busy_retry(|| load_sessions(self.conn(), &sql, &limit))
    }

    /// Look up by full id, falling back to a unique id prefix
    pub fn get_session(&self, id_or_prefix: &str) -> Result<Option<Session>> {
        let exact = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        let mut found = with_busy_retry(|| load_sessions(self.conn(), &exact, &id_or_prefix))?;
        if found.is_empty() {
            let prefix = format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id LIKE ?1 ESCAPE '\\' LIMIT 2"
            );
            let pattern = format!("{}%", crate::entries::escape_like(id_or_prefix));
            found = with_busy_retry(|| load_sessions(self.conn(), &prefix, &pattern))?;
            if found.len() > 1 {
                return Err(StoreError::Ambiguous(id_or_prefix.to_string()));
            }
        }
        Ok(found.pop())
    }

    /// 1-based position in newest-first order
    pub fn session_by_index(&self, index: usize) -> Result<Option<Session>> {
        if index == 0 {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY end_time DESC, id LIMIT 1 OFFSET ?1"
        );
        let offset = (index - 1) as i64;
        Ok(with_busy_retry(|| load_sessions(self.conn(), &sql, &offset))?.pop())
    }

    pub fn last_session(&self) -> Result<Option<Session>> {
        self.session_by_index(1)
    }
}
