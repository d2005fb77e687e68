use crate::archive::{self, RawMessage};
use crate::entries::{self, InsertOutcome};
use crate::error::Result;
use crate::ledger;
use crate::schema;
use chrono::{DateTime, SecondsFormat, Utc};
use recollect_core::{EntryType, ImportRecord, NewEntry};
use rusqlite::types::Type;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Handle to one knowledge database; pass it explicitly to every operation
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self::init(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        schema::migrate(&mut conn)?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction; dropping it without `commit` rolls back
    pub fn transaction(&mut self) -> Result<StoreTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(StoreTx { tx })
    }

    pub fn schema_version(&self) -> Result<i64> {
        schema::current_version(&self.conn)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        let mut by_type = BTreeMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT type, COUNT(*) FROM entries GROUP BY type")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (entry_type, n) = row?;
            if let Ok(entry_type) = entry_type.parse::<EntryType>() {
                by_type.insert(entry_type, n as usize);
            }
        }

        Ok(StoreCounts {
            entries: count("SELECT COUNT(*) FROM entries")?,
            indexed: count("SELECT COUNT(*) FROM entries_fts")?,
            sessions: count("SELECT COUNT(*) FROM sessions")?,
            imports: count("SELECT COUNT(*) FROM import_history")?,
            raw_messages: count("SELECT COUNT(*) FROM raw_messages")?,
            by_type,
        })
    }
}

/// Row counts used by status output and integrity checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub entries: usize,
    /// Rows in the full-text mirror; always equal to `entries`
    pub indexed: usize,
    pub sessions: usize,
    pub imports: usize,
    pub raw_messages: usize,
    pub by_type: BTreeMap<EntryType, usize>,
}

/// One atomic unit of writes
pub struct StoreTx<'a> {
    tx: Transaction<'a>,
}

impl StoreTx<'_> {
    pub(crate) fn connection(&self) -> &Connection {
        &self.tx
    }

    pub fn insert_entry(&self, entry: &NewEntry) -> Result<InsertOutcome> {
        entries::insert(&self.tx, entry)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        entries::contains_key(&self.tx, key)
    }

    pub fn archive(&self, rows: &[RawMessage]) -> Result<usize> {
        archive::insert(&self.tx, rows)
    }

    pub fn upsert_import(&self, record: &ImportRecord) -> Result<()> {
        ledger::upsert(&self.tx, record)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

/// Fixed-width UTC form so text comparison matches time order
pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn ts_from_sql(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
