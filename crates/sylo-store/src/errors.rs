//! Error handling for sylo-store

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Migration {migration_id} failed: {reason}")]
    Migration { migration_id: String, reason: String },

    #[error("Checksum mismatch for migration {migration_id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        migration_id: String,
        expected: String,
        actual: String,
    },

    #[error("stored timestamp '{value}' is not RFC 3339")]
    Timestamp { value: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> StoreError {
    StoreError::Migration {
        migration_id: migration_id.to_string(),
        reason: reason.to_string(),
    }
}
