//! Roles and the capabilities they grant.
//!
//! Only [`Role::Admin`] exists today. Access checks are written against
//! [`Capability`] rather than a role name so that lower-privilege roles can be
//! added later without touching the extractors or handlers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role name stored in `users.role` and carried in the JWT `role` claim.
pub const ROLE_ADMIN: &str = "admin";

/// A user role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
}

/// An action a role may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, update and delete user accounts.
    ManageUsers,
    /// Mutate templates, categories and tags.
    EditContent,
    /// Dispatch rendered templates through the mail transport.
    SendMail,
}

impl Role {
    /// Capabilities granted to this role.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::ManageUsers,
                Capability::EditContent,
                Capability::SendMail,
            ],
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Check whether a raw role name (as found in a token claim) grants a capability.
///
/// Unknown role names grant nothing.
pub fn role_name_can(role: &str, capability: Capability) -> bool {
    role.parse::<Role>()
        .map(|r| r.can(capability))
        .unwrap_or(false)
}
