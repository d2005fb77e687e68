use crate::error::{Result, StoreError};
use rusqlite::ErrorCode;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 5;
const BACKOFF: Duration = Duration::from_millis(50);

pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Re-run `op` while the database reports transient lock contention
pub fn with_busy_retry<T, F>(mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Err(StoreError::Database(e)) if is_busy(&e) && attempt < MAX_ATTEMPTS => {
                tracing::debug!(attempt, error = %e, "database busy, retrying");
                std::thread::sleep(BACKOFF * attempt);
                attempt += 1;
            }
            result => return result,
        }
    }
}
