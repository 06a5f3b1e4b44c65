//! Database connection management

use crate::errors::Result;
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

/// Apply connection pragmas
///
/// WAL is skipped for in-memory databases, which do not support it.
pub fn configure(conn: &Connection, in_memory: bool) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if !in_memory {
        // journal_mode returns a row, so it cannot go through execute_batch
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    }
    Ok(())
}
