use std::fmt;

use serde::{Deserialize, Serialize};

/// Role identifiers that carry administrative privileges.
///
/// Membership is exact string equality. Several spellings are accepted because
/// the server has issued all three; nothing else is inferred from them.
pub const ADMIN_ROLES: [&str; 3] = ["HR_ADMIN", "admin", "hr"];

/// Opaque role string as issued by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.0)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::new(role)
    }
}

/// True iff `role` is exactly one of [`ADMIN_ROLES`]
pub fn is_admin_role(role: &str) -> bool {
    ADMIN_ROLES.contains(&role)
}
