//! Persistence backend collaborator
//!
//! The orchestration core never inspects how handlers store data. It only
//! needs a handle to pass into each `CommandContext` and a liveness check for
//! the health check.

use async_trait::async_trait;
use std::any::Any;
use thiserror::Error;

/// Failure reported by a backend check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthCheckError {
    /// The backend answered but reported a failure
    #[error("{0}")]
    Failed(String),
    /// The backend could not be reached at all
    #[error("{0}")]
    Unreachable(String),
}

#[async_trait]
pub trait PersistenceBackend: Send + Sync + 'static {
    /// Short backend name shown in health details
    fn name(&self) -> &str;

    /// Perform a trivial live operation against the backend
    async fn check_connection(&self) -> Result<(), HealthCheckError>;

    /// Access the concrete backend from a handler
    fn as_any(&self) -> &dyn Any;
}

/// Backend for deployments whose handlers keep no state
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

#[async_trait]
impl PersistenceBackend for NoopBackend {
    fn name(&self) -> &str {
        "none"
    }

    async fn check_connection(&self) -> Result<(), HealthCheckError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
