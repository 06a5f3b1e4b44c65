use serde::{Deserialize, Serialize};

/// Role that bypasses every permission check
pub const ADMIN_ROLE: &str = "admin";

/// Caller identity produced by an external authenticator
///
/// The core treats it as opaque apart from `role`, which drives permission
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl CallerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            role: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(ADMIN_ROLE)
    }
}
