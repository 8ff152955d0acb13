//! Staff roles.
//!
//! Roles are stored as named groups in the database; membership is
//! many-to-many with users. This enum is the typed view of the two group
//! names the system recognizes.

use serde::{Deserialize, Serialize};

/// A staff role, backed by a named group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Manages the catalog, staff membership, and the full order lifecycle.
    Manager,
    /// Marks assigned orders as delivered.
    DeliveryCrew,
}

/// Error returned when a string names no known role.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0} (expected \"manager\" or \"delivery-crew\")")]
pub struct RoleParseError(pub String);

impl Role {
    /// All roles, in a stable order.
    pub const ALL: [Self; 2] = [Self::Manager, Self::DeliveryCrew];

    /// The group name this role is stored under.
    #[must_use]
    pub const fn group_name(self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::DeliveryCrew => "Delivery crew",
        }
    }

    /// The URL path segment naming this role (`/groups/{segment}/users`).
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::DeliveryCrew => "delivery-crew",
        }
    }

    /// Resolve a role from its stored group name.
    #[must_use]
    pub fn from_group_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.group_name() == name)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.path_segment() == s)
            .ok_or_else(|| RoleParseError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_roundtrip() {
        for role in Role::ALL {
            let parsed: Role = role.path_segment().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_group_name_roundtrip() {
        assert_eq!(Role::from_group_name("Manager"), Some(Role::Manager));
        assert_eq!(
            Role::from_group_name("Delivery crew"),
            Some(Role::DeliveryCrew)
        );
        assert_eq!(Role::from_group_name("Waiters"), None);
    }

    #[test]
    fn test_unknown_segment() {
        assert!("chef".parse::<Role>().is_err());
        // Group names are not path segments
        assert!("Manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Role::DeliveryCrew).unwrap(),
            "\"delivery-crew\""
        );
        let parsed: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(parsed, Role::Manager);
    }
}
