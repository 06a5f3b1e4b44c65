//! Permission policy trait and implementations
//!
//! The orchestrator consults the injected policy for any command that
//! declares required permissions. Callers with the `admin` role pass before
//! the policy is consulted.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::CallerIdentity;

#[async_trait]
pub trait PermissionPolicy: Send + Sync {
    /// Whether `identity` holds every permission in `required`
    async fn check(&self, identity: &CallerIdentity, required: &[String]) -> bool;

    /// Policy name for logs and health details
    fn name(&self) -> &'static str;
}

/// Lets every caller through
///
/// Placeholder carried over from deployments without an RBAC backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

#[async_trait]
impl PermissionPolicy for PermissivePolicy {
    async fn check(&self, _identity: &CallerIdentity, _required: &[String]) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "permissive"
    }
}

/// Rejects every non-admin caller for permission-gated commands
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyByDefaultPolicy;

#[async_trait]
impl PermissionPolicy for DenyByDefaultPolicy {
    async fn check(&self, _identity: &CallerIdentity, _required: &[String]) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "deny_by_default"
    }
}

/// Grants permissions per role
///
/// # Example
/// ```
/// use sylo_core::policy::RolePermissionPolicy;
///
/// let policy = RolePermissionPolicy::new()
///     .grant("manager", ["project:delete", "project:archive"]);
/// assert!(policy.role_has("manager", "project:delete"));
/// assert!(!policy.role_has("user", "project:delete"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RolePermissionPolicy {
    grants: HashMap<String, HashSet<String>>,
}

impl RolePermissionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add permissions to a role
    pub fn grant<I, S>(mut self, role: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants
            .entry(role.into())
            .or_default()
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn from_grants(grants: &BTreeMap<String, Vec<String>>) -> Self {
        grants
            .iter()
            .fold(Self::new(), |policy, (role, perms)| {
                policy.grant(role.clone(), perms.iter().cloned())
            })
    }

    pub fn role_has(&self, role: &str, permission: &str) -> bool {
        self.grants
            .get(role)
            .is_some_and(|granted| granted.contains(permission))
    }
}

#[async_trait]
impl PermissionPolicy for RolePermissionPolicy {
    async fn check(&self, identity: &CallerIdentity, required: &[String]) -> bool {
        let Some(role) = identity.role() else {
            return false;
        };
        required.iter().all(|perm| self.role_has(role, perm))
    }

    fn name(&self) -> &'static str {
        "role_based"
    }
}
