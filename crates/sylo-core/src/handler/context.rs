//! Per-dispatch execution context handed to handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use sylo_core_types::RequestContext;
use tokio_util::sync::CancellationToken;

use crate::model::CallerIdentity;
use crate::persistence::PersistenceBackend;

/// Everything a handler may know about the call it is serving
///
/// Built fresh by the orchestrator for each dispatch. Cloning is cheap.
#[derive(Clone)]
pub struct CommandContext {
    user: CallerIdentity,
    correlation: RequestContext,
    timestamp: DateTime<Utc>,
    persistence: Arc<dyn PersistenceBackend>,
    cancellation: CancellationToken,
}

impl CommandContext {
    pub fn new(
        user: CallerIdentity,
        correlation: RequestContext,
        persistence: Arc<dyn PersistenceBackend>,
    ) -> Self {
        Self {
            user,
            correlation,
            timestamp: Utc::now(),
            persistence,
            cancellation: CancellationToken::new(),
        }
    }

    /// Pin the dispatch timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn user(&self) -> &CallerIdentity {
        &self.user
    }

    pub fn request_id(&self) -> &str {
        self.correlation.request_id.as_str()
    }

    pub fn correlation(&self) -> &RequestContext {
        &self.correlation
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceBackend> {
        &self.persistence
    }

    /// Downcast the persistence backend to a concrete type
    pub fn persistence_as<T: 'static>(&self) -> Option<&T> {
        self.persistence.as_any().downcast_ref::<T>()
    }

    /// Token cancelled when the caller abandons the dispatch or it times out
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("user", &self.user)
            .field("correlation", &self.correlation)
            .field("timestamp", &self.timestamp)
            .field("persistence", &self.persistence.name())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
