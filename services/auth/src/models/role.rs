//! Role model and privilege ordering

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role, ordered by privilege: `Readonly < Admin < SuperAdmin`.
///
/// The derived `Ord` is the authorization hierarchy; the rule helpers in
/// `authz` build on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Readonly,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role grants the admin panel (admin or super admin)
    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }

    /// Human-readable role name shown in the UI
    pub fn display_name(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Readonly => "Read Only",
        }
    }

    /// Stable wire identifier, matching the persisted documents
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Readonly => "readonly",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order() {
        assert!(Role::SuperAdmin > Role::Admin);
        assert!(Role::Admin > Role::Readonly);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        let role: Role = serde_json::from_str("\"readonly\"").unwrap();
        assert_eq!(role, Role::Readonly);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Role::SuperAdmin.display_name(), "Super Admin");
        assert_eq!(Role::Readonly.display_name(), "Read Only");
    }
}
