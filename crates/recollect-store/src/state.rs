//! Working state: open goals and next steps

use crate::entries::escape_like;
use crate::error::Result;
use crate::retry::with_busy_retry;
use crate::store::{ts_from_sql, ts_to_sql, Store};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Goal,
    NextStep,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Goal => "goal",
            StateKind::NextStep => "next_step",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateItem {
    pub id: i64,
    pub kind: StateKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Open items, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentState {
    pub goals: Vec<StateItem>,
    pub next_steps: Vec<StateItem>,
}

impl CurrentState {
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.next_steps.is_empty()
    }
}

fn row_to_item(kind: StateKind, row: &Row) -> rusqlite::Result<StateItem> {
    let timestamp: String = row.get(2)?;
    Ok(StateItem {
        id: row.get(0)?,
        kind,
        content: row.get(1)?,
        timestamp: ts_from_sql(2, &timestamp)?,
    })
}

impl Store {
    pub fn add_state(&mut self, kind: StateKind, content: &str) -> Result<StateItem> {
        let timestamp = Utc::now();
        let tx = self.transaction()?;
        tx.connection().execute(
            "INSERT INTO state_items (kind, content, timestamp) VALUES (?1, ?2, ?3)",
            params![kind.as_str(), content, ts_to_sql(&timestamp)],
        )?;
        let id = tx.connection().last_insert_rowid();
        tx.commit()?;
        Ok(StateItem {
            id,
            kind,
            content: content.to_string(),
            timestamp,
        })
    }

    pub fn open_state(&self, kind: StateKind) -> Result<Vec<StateItem>> {
        with_busy_retry(|| {
            let mut stmt = self.conn().prepare(
                "SELECT id, content, timestamp FROM state_items
                 WHERE kind = ?1 AND completed = 0
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![kind.as_str()], |row| row_to_item(kind, row))?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn current_state(&self) -> Result<CurrentState> {
        Ok(CurrentState {
            goals: self.open_state(StateKind::Goal)?,
            next_steps: self.open_state(StateKind::NextStep)?,
        })
    }

    /// Mark the newest open item containing `text` (case-insensitive) as done
    pub fn complete_state(&mut self, kind: StateKind, text: &str) -> Result<Option<StateItem>> {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        let tx = self.transaction()?;
        let found = tx
            .connection()
            .query_row(
                "SELECT id, content, timestamp FROM state_items
                 WHERE kind = ?1 AND completed = 0 AND lower(content) LIKE ?2 ESCAPE '\\'
                 ORDER BY timestamp DESC, id DESC LIMIT 1",
                params![kind.as_str(), pattern],
                |row| row_to_item(kind, row),
            )
            .optional()?;
        if let Some(item) = &found {
            tx.connection().execute(
                "UPDATE state_items SET completed = 1 WHERE id = ?1",
                params![item.id],
            )?;
        }
        tx.commit()?;
        Ok(found)
    }

    /// Remove every item of one kind, open or done
    pub fn clear_state(&mut self, kind: StateKind) -> Result<usize> {
        let tx = self.transaction()?;
        let removed = tx
            .connection()
            .execute("DELETE FROM state_items WHERE kind = ?1", params![kind.as_str()])?;
        tx.commit()?;
        Ok(removed)
    }
}
