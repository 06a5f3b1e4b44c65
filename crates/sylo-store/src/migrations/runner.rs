//! Migration runner
//!
//! Applies pending migrations in order, each in its own transaction. A
//! migration that was already applied is skipped, unless its SQL changed
//! since, which is an error.

use crate::errors::{migration_error, Result, StoreError};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )?;
    Ok(())
}

fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |row| row.get(0),
        )
        .optional()?;

    match recorded {
        Some(Some(expected)) if expected != checksum => {
            return Err(StoreError::ChecksumMismatch {
                migration_id: migration_id.to_string(),
                expected,
                actual: checksum,
            });
        }
        Some(_) => return Ok(()),
        None => {}
    }

    let tx = conn.transaction()?;
    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, chrono::Utc::now().timestamp(), checksum],
    )?;
    tx.commit()?;

    tracing::info!(
        component = module_path!(),
        op = "apply_migration",
        migration_id,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
    }
}
