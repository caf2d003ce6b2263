//! Role type for access control decisions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of principal roles.
///
/// Admin capabilities are a superset of Worker capabilities; every gate that
/// admits workers must also admit admins. Checks go through [`Role::includes`]
/// so the hierarchy lives in one place instead of scattered string compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Worker,
}

/// Error type for parsing Role from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl std::fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "worker" => Ok(Role::Worker),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }

    /// Check if this role has at least the permissions of another role
    pub fn includes(&self, other: &Role) -> bool {
        match self {
            Role::Admin => true, // Admin includes all permissions
            Role::Worker => matches!(other, Role::Worker),
        }
    }
}
