#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json column: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("id prefix `{0}` matches more than one record")]
    Ambiguous(String),
    #[error("an entry with the same type and content already exists ({0})")]
    Duplicate(String),
    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaVersion { found: i64, supported: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
