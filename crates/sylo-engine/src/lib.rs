//! Sylo Engine - command orchestration
//!
//! Owns the dispatch pipeline that sits between transport adapters and the
//! registered command handlers: lookup, enabled check, permission check,
//! parameter validation, handler invocation and envelope construction. Also
//! provides sequential and parallel batches, a permission-filtered command
//! listing and a health check.

pub mod config;
pub mod orchestrator;

pub use config::{ConfigError, OrchestratorConfig, PolicyKind};
pub use orchestrator::{
    CommandHealth, CommandSummary, HealthDetails, HealthReport, HealthStatus, Orchestrator,
    OrchestratorBuilder, PersistenceHealth,
};
