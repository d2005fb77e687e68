//! Per-transcript import bookkeeping

use crate::error::Result;
use crate::retry::with_busy_retry;
use crate::store::{ts_from_sql, ts_to_sql, Store};
use recollect_core::ImportRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};

const LEDGER_COLUMNS: &str = "path, file_hash, last_message_id, last_message_timestamp, \
     messages_imported, entries_created, import_timestamp";

/// Insert or refresh the record for `record.path`
///
/// `last_message_timestamp` only moves forward and a missing
/// `last_message_id` keeps the stored cursor.
pub(crate) fn upsert(conn: &Connection, record: &ImportRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO import_history
            (path, file_hash, last_message_id, last_message_timestamp,
             messages_imported, entries_created, import_timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(path) DO UPDATE SET
            file_hash = excluded.file_hash,
            last_message_id = COALESCE(excluded.last_message_id, import_history.last_message_id),
            last_message_timestamp = CASE
                WHEN import_history.last_message_timestamp IS NULL
                  OR excluded.last_message_timestamp > import_history.last_message_timestamp
                THEN excluded.last_message_timestamp
                ELSE import_history.last_message_timestamp
            END,
            messages_imported = excluded.messages_imported,
            entries_created = excluded.entries_created,
            import_timestamp = excluded.import_timestamp",
        params![
            record.path,
            record.file_hash,
            record.last_message_id,
            record.last_message_timestamp.as_ref().map(ts_to_sql),
            record.messages_imported as i64,
            record.entries_created as i64,
            ts_to_sql(&record.import_timestamp),
        ],
    )?;
    Ok(())
}

fn row_to_record(row: &Row) -> rusqlite::Result<ImportRecord> {
    let last_ts: Option<String> = row.get(3)?;
    let imported_at: String = row.get(6)?;
    Ok(ImportRecord {
        path: row.get(0)?,
        file_hash: row.get(1)?,
        last_message_id: row.get(2)?,
        last_message_timestamp: last_ts.map(|ts| ts_from_sql(3, &ts)).transpose()?,
        messages_imported: row.get::<_, i64>(4)? as usize,
        entries_created: row.get::<_, i64>(5)? as usize,
        import_timestamp: ts_from_sql(6, &imported_at)?,
    })
}

impl Store {
    pub fn get_import(&self, path: &str) -> Result<Option<ImportRecord>> {
        with_busy_retry(|| {
            let record = self
                .conn()
                .query_row(
                    &format!("SELECT {LEDGER_COLUMNS} FROM import_history WHERE path = ?1"),
                    params![path],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// Every ledger record, most recently imported first
    pub fn list_imports(&self) -> Result<Vec<ImportRecord>> {
        with_busy_retry(|| {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {LEDGER_COLUMNS} FROM import_history ORDER BY import_timestamp DESC, path"
            ))?;
            let rows = stmt.query_map([], row_to_record)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn upsert_import(&mut self, record: &ImportRecord) -> Result<()> {
        let tx = self.transaction()?;
        tx.upsert_import(record)?;
        tx.commit()
    }
}
