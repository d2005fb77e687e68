//! Versioned schema with ordered forward migrations

use crate::error::{Result, StoreError};
use crate::store::ts_to_sql;
use chrono::Utc;
use rusqlite::{params, Connection, TransactionBehavior};

pub const LATEST_SCHEMA_VERSION: i64 = 3;

const CREATE_SCHEMA_MIGRATIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
  version INTEGER PRIMARY KEY,
  applied_at TEXT NOT NULL
);
";

const MIGRATION_001_SQL: &str = r"
CREATE TABLE IF NOT EXISTS entries (
  id TEXT PRIMARY KEY,
  type TEXT NOT NULL,
  content TEXT NOT NULL,
  reasoning TEXT,
  timestamp TEXT NOT NULL,
  branch TEXT,
  commit_hash TEXT,
  metadata TEXT NOT NULL DEFAULT '{}',
  content_hash TEXT NOT NULL UNIQUE
);
CREATE INDEX IF NOT EXISTS idx_entries_type ON entries(type);
CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp);

CREATE TABLE IF NOT EXISTS tags (
  entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
  tag TEXT NOT NULL,
  PRIMARY KEY (entry_id, tag)
);
CREATE INDEX IF NOT EXISTS idx_tags_tag ON tags(tag);

CREATE TABLE IF NOT EXISTS files (
  entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
  file_path TEXT NOT NULL,
  PRIMARY KEY (entry_id, file_path)
);
CREATE INDEX IF NOT EXISTS idx_files_path ON files(file_path);

CREATE TABLE IF NOT EXISTS sessions (
  id TEXT PRIMARY KEY,
  start_time TEXT NOT NULL,
  end_time TEXT NOT NULL,
  duration_minutes INTEGER NOT NULL,
  summary TEXT,
  branch TEXT,
  reason TEXT
);
CREATE INDEX IF NOT EXISTS idx_sessions_end ON sessions(end_time);

CREATE TABLE IF NOT EXISTS session_files (
  session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
  file_path TEXT NOT NULL,
  PRIMARY KEY (session_id, file_path)
);

CREATE TABLE IF NOT EXISTS session_commands (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
  command TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session_entry_counts (
  session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
  entry_type TEXT NOT NULL,
  count INTEGER NOT NULL,
  PRIMARY KEY (session_id, entry_type)
);

CREATE TABLE IF NOT EXISTS session_user_requests (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
  request TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS import_history (
  path TEXT PRIMARY KEY,
  file_hash TEXT NOT NULL,
  last_message_id TEXT,
  last_message_timestamp TEXT,
  messages_imported INTEGER NOT NULL DEFAULT 0,
  entries_created INTEGER NOT NULL DEFAULT 0,
  import_timestamp TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
  entry_id UNINDEXED,
  content,
  reasoning,
  tokenize = 'porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS entries_ai AFTER INSERT ON entries BEGIN
  INSERT INTO entries_fts(entry_id, content, reasoning)
  VALUES (new.id, new.content, COALESCE(new.reasoning, ''));
END;

CREATE TRIGGER IF NOT EXISTS entries_ad AFTER DELETE ON entries BEGIN
  DELETE FROM entries_fts WHERE entry_id = old.id;
END;

CREATE TRIGGER IF NOT EXISTS entries_au AFTER UPDATE ON entries BEGIN
  DELETE FROM entries_fts WHERE entry_id = old.id;
  INSERT INTO entries_fts(entry_id, content, reasoning)
  VALUES (new.id, new.content, COALESCE(new.reasoning, ''));
END;
";

const MIGRATION_002_SQL: &str = r"
CREATE TABLE IF NOT EXISTS raw_messages (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  transcript TEXT NOT NULL,
  line INTEGER NOT NULL,
  message_id TEXT,
  parent_id TEXT,
  session_id TEXT,
  role TEXT NOT NULL,
  timestamp TEXT NOT NULL,
  text TEXT NOT NULL,
  noise TEXT NOT NULL,
  raw_json TEXT NOT NULL,
  UNIQUE (transcript, line)
);
CREATE INDEX IF NOT EXISTS idx_raw_messages_session ON raw_messages(session_id);
CREATE INDEX IF NOT EXISTS idx_raw_messages_timestamp ON raw_messages(timestamp);
";

const MIGRATION_003_SQL: &str = r"
CREATE TABLE IF NOT EXISTS state_items (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  kind TEXT NOT NULL,
  content TEXT NOT NULL,
  timestamp TEXT NOT NULL,
  completed INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_state_items_kind ON state_items(kind, completed);
";

const MIGRATIONS: &[(i64, &str)] = &[
    (1, MIGRATION_001_SQL),
    (2, MIGRATION_002_SQL),
    (3, MIGRATION_003_SQL),
];

pub(crate) fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(version)
}

/// Apply every migration newer than the recorded version
pub(crate) fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(CREATE_SCHEMA_MIGRATIONS_SQL)?;

    let found = current_version(conn)?;
    if found > LATEST_SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion {
            found,
            supported: LATEST_SCHEMA_VERSION,
        });
    }

    for (version, sql) in MIGRATIONS {
        // another process may have migrated while we waited for the lock
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if current_version(&tx)? >= *version {
            continue;
        }
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
            params![version, ts_to_sql(&Utc::now())],
        )?;
        tx.commit()?;
        tracing::info!(version, "applied schema migration");
    }
    Ok(())
}
