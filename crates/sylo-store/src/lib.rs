//! Sylo Store - document persistence for command handlers
//!
//! Provides:
//! - The `DocumentStore` trait handlers read and write through
//! - An in-memory backend for tests and ephemeral runs
//! - A SQLite backend with embedded, checksummed migrations
//!
//! Both backends also implement `sylo_core::PersistenceBackend`, so the same
//! instance can be handed to the orchestrator for health checks.

pub mod db;
pub mod document;
pub mod errors;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use document::{Document, DocumentStore, ListFilter};
pub use errors::{Result, StoreError};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
