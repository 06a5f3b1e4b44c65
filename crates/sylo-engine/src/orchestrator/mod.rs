//! The orchestrator
//!
//! ## Dispatch pipeline (in order):
//! 1. Resolve the request id, capture the timestamp and start the clock
//! 2. Lookup (unknown or disabled → `COMMAND_NOT_FOUND`)
//! 3. Permission check for gated commands (admins always pass)
//! 4. Declarative then custom parameter validation
//! 5. Handler execution with a fresh `CommandContext`
//! 6. Envelope construction
//!
//! Every path ends in exactly one `ResponseEnvelope`; nothing is thrown to the
//! caller.

mod batch;
mod dispatch;
mod health;
mod introspection;

pub use health::{CommandHealth, HealthDetails, HealthReport, HealthStatus, PersistenceHealth};
pub use introspection::CommandSummary;

use std::sync::Arc;
use std::time::Instant;
use sylo_core::persistence::{NoopBackend, PersistenceBackend};
use sylo_core::policy::PermissionPolicy;
use sylo_core::registry::CommandRegistry;

use crate::config::{ConfigError, OrchestratorConfig};

pub struct Orchestrator {
    registry: Arc<CommandRegistry>,
    policy: Arc<dyn PermissionPolicy>,
    persistence: Arc<dyn PersistenceBackend>,
    config: OrchestratorConfig,
    started: Instant,
}

impl Orchestrator {
    pub fn builder(registry: Arc<CommandRegistry>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            registry,
            policy: None,
            persistence: None,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("policy", &self.policy.name())
            .field("persistence", &self.persistence.name())
            .field("config", &self.config)
            .finish()
    }
}

pub struct OrchestratorBuilder {
    registry: Arc<CommandRegistry>,
    policy: Option<Arc<dyn PermissionPolicy>>,
    persistence: Option<Arc<dyn PersistenceBackend>>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Use this policy instead of the one named in the config
    pub fn policy(mut self, policy: Arc<dyn PermissionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn persistence(mut self, persistence: Arc<dyn PersistenceBackend>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is inconsistent.
    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        self.config.validate()?;
        let policy = match self.policy {
            Some(policy) => policy,
            None => self.config.build_policy(),
        };
        let persistence: Arc<dyn PersistenceBackend> = match self.persistence {
            Some(persistence) => persistence,
            None => Arc::new(NoopBackend),
        };

        tracing::info!(
            component = module_path!(),
            op = "build_orchestrator",
            policy = policy.name(),
            persistence = persistence.name(),
            commands = self.registry.len(),
        );

        Ok(Orchestrator {
            registry: self.registry,
            policy,
            persistence,
            config: self.config,
            started: Instant::now(),
        })
    }
}

/// Render a panic payload for logs
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
