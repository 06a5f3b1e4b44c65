//! Orchestrator configuration
//!
//! Every field has a default so a partial TOML table (or none at all) yields
//! a working orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use sylo_core::policy::{
    DenyByDefaultPolicy, PermissionPolicy, PermissivePolicy, RolePermissionPolicy,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which permission policy the orchestrator consults for non-admin callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Permissive,
    DenyByDefault,
    RoleBased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub permission_policy: PolicyKind,
    /// Role to granted permissions, used by `role_based`
    pub role_grants: BTreeMap<String, Vec<String>>,
    /// Abort handlers that run longer than this
    pub handler_timeout_ms: Option<u64>,
    pub health_check_timeout_ms: u64,
    /// Include handler error chains in `EXECUTION_FAILED` details
    pub expose_error_details: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            permission_policy: PolicyKind::default(),
            role_grants: BTreeMap::new(),
            handler_timeout_ms: None,
            health_check_timeout_ms: 2000,
            expose_error_details: false,
        }
    }
}

impl OrchestratorConfig {
    /// Check field combinations serde cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handler_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "handler_timeout_ms",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        if self.health_check_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "health_check_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.permission_policy == PolicyKind::RoleBased && self.role_grants.is_empty() {
            return Err(ConfigError::Invalid {
                field: "role_grants",
                reason: "role_based policy needs at least one role".to_string(),
            });
        }
        Ok(())
    }

    pub fn build_policy(&self) -> Arc<dyn PermissionPolicy> {
        match self.permission_policy {
            PolicyKind::Permissive => Arc::new(PermissivePolicy),
            PolicyKind::DenyByDefault => Arc::new(DenyByDefaultPolicy),
            PolicyKind::RoleBased => Arc::new(RolePermissionPolicy::from_grants(&self.role_grants)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.permission_policy, PolicyKind::Permissive);
        assert_eq!(config.health_check_timeout_ms, 2000);
        assert!(config.handler_timeout_ms.is_none());
        assert!(!config.expose_error_details);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OrchestratorConfig = toml::from_str(
            r#"
            permission_policy = "role_based"
            handler_timeout_ms = 500

            [role_grants]
            manager = ["project:delete"]
            "#,
        )
        .unwrap();
        assert_eq!(config.permission_policy, PolicyKind::RoleBased);
        assert_eq!(config.handler_timeout_ms, Some(500));
        assert_eq!(config.health_check_timeout_ms, 2000);
        assert_eq!(config.build_policy().name(), "role_based");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = OrchestratorConfig {
            handler_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "handler_timeout_ms", .. })
        ));
    }

    #[test]
    fn test_role_based_requires_grants() {
        let config = OrchestratorConfig {
            permission_policy: PolicyKind::RoleBased,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
