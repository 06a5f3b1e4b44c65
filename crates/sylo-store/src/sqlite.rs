//! SQLite backend
//!
//! One connection behind a mutex. Statements are short, so handlers share it
//! without a pool.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use sylo_core::persistence::{PersistenceBackend, HealthCheckError};

use crate::db;
use crate::document::{new_id, Document, DocumentStore, ListFilter};
use crate::errors::{Result, StoreError};
use crate::migrations::apply_migrations;

pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) the database file and apply pending migrations
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path.as_ref())?;
        db::configure(&conn, false)?;
        apply_migrations(&mut conn)?;
        tracing::info!(
            component = module_path!(),
            op = "open_store",
            path = %path.as_ref().display(),
        );
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.as_ref().to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn, true)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend").field("path", &self.path).finish()
    }
}

struct RawDocument {
    id: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl RawDocument {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            body: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    fn decode(self) -> Result<Document> {
        Ok(Document {
            id: self.id,
            body: serde_json::from_str(&self.body)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Fixed-width so that text order matches time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp {
            value: value.to_string(),
        })
}

fn select_one(conn: &Connection, collection: &str, id: &str) -> Result<Option<Document>> {
    conn.query_row(
        "SELECT id, body, created_at, updated_at FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
        RawDocument::from_row,
    )
    .optional()?
    .map(RawDocument::decode)
    .transpose()
}

#[async_trait]
impl DocumentStore for SqliteBackend {
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document> {
        let doc = Document::new(new_id(), body);
        self.conn()?.execute(
            "INSERT INTO documents (collection, id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                collection,
                doc.id,
                serde_json::to_string(&doc.body)?,
                format_timestamp(&doc.created_at),
                format_timestamp(&doc.updated_at),
            ],
        )?;
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let conn = self.conn()?;
        select_one(&conn, collection, id)
    }

    async fn list(&self, collection: &str, filter: &ListFilter) -> Result<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, body, created_at, updated_at FROM documents
             WHERE collection = ?1 ORDER BY created_at, id",
        )?;
        let docs = stmt
            .query_map([collection], RawDocument::from_row)?
            .map(|raw| raw.map_err(StoreError::from).and_then(RawDocument::decode))
            .collect::<Result<Vec<_>>>()?;
        Ok(filter.apply(docs))
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<Option<Document>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(mut doc) = select_one(&tx, collection, id)? else {
            return Ok(None);
        };
        doc.apply_patch(patch);
        tx.execute(
            "UPDATE documents SET body = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
            params![
                serde_json::to_string(&doc.body)?,
                format_timestamp(&doc.updated_at),
                collection,
                id,
            ],
        )?;
        tx.commit()?;
        Ok(Some(doc))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let removed = self.conn()?.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl PersistenceBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn check_connection(&self) -> std::result::Result<(), HealthCheckError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| HealthCheckError::Unreachable("store lock poisoned".to_string()))?;
        conn.query_row("SELECT id FROM documents LIMIT 1", [], |_| Ok(()))
            .optional()
            .map(|_| ())
            .map_err(|e| HealthCheckError::Failed(e.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
