//! Process wiring: store, registry and orchestrator

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use sylo_core::model::CallerIdentity;
use sylo_core::registry::CommandRegistry;
use sylo_engine::Orchestrator;
use sylo_store::{DocumentStore, MemoryBackend, SqliteBackend};

use crate::config::{AppConfig, StoreKind};

/// Who the command runs as
///
/// Identity is taken as given; authentication belongs to whatever invokes
/// the binary.
#[derive(Debug, Clone, Args)]
pub struct IdentityArgs {
    #[arg(long, global = true, env = "SYLO_USER_ID", default_value = "cli")]
    pub user_id: String,

    #[arg(long, global = true, env = "SYLO_USER_ROLE")]
    pub role: Option<String>,

    #[arg(long, global = true, env = "SYLO_USER_EMAIL")]
    pub email: Option<String>,
}

impl IdentityArgs {
    pub fn identity(&self) -> CallerIdentity {
        let mut identity = CallerIdentity::new(self.user_id.clone());
        if let Some(role) = &self.role {
            identity = identity.with_role(role.clone());
        }
        if let Some(email) = &self.email {
            identity = identity.with_email(email.clone());
        }
        identity
    }
}

/// Build the orchestrator with every built-in command registered
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let registry = Arc::new(CommandRegistry::new());

    let orchestrator = match config.store.kind {
        StoreKind::Memory => {
            let store = Arc::new(MemoryBackend::new());
            register(&registry, store.clone())?;
            Orchestrator::builder(registry).persistence(store)
        }
        StoreKind::Sqlite => {
            if let Some(parent) = config.store.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let store = Arc::new(
                SqliteBackend::open(&config.store.path)
                    .with_context(|| format!("failed to open {}", config.store.path.display()))?,
            );
            register(&registry, store.clone())?;
            Orchestrator::builder(registry).persistence(store)
        }
    };

    Ok(orchestrator
        .config(config.orchestrator.clone())
        .build()?)
}

fn register(registry: &CommandRegistry, store: Arc<dyn DocumentStore>) -> Result<()> {
    sylo_commands::register_all(registry, store).context("failed to register commands")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_flags() {
        let args = IdentityArgs {
            user_id: "u-9".to_string(),
            role: Some("admin".to_string()),
            email: None,
        };
        let identity = args.identity();
        assert_eq!(identity.id, "u-9");
        assert!(identity.is_admin());
        assert!(identity.email.is_none());
    }

    #[test]
    fn test_build_sqlite_orchestrator_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.store.kind = StoreKind::Sqlite;
        config.store.path = dir.path().join("nested").join("sylo.db");

        let orchestrator = build_orchestrator(&config).unwrap();
        assert!(orchestrator.registry().has("create_project"));
        assert!(config.store.path.exists());
    }
}
