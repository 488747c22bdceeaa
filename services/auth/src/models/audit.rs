//! Audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of administrative action recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateUser,
    UpdateUser,
    DeleteUser,
    EnableUser,
    DisableUser,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateUser => "UPDATE_USER",
            AuditAction::DeleteUser => "DELETE_USER",
            AuditAction::EnableUser => "ENABLE_USER",
            AuditAction::DisableUser => "DISABLE_USER",
        };
        f.write_str(s)
    }
}

/// One audit log entry, as persisted in `cache/audit_log.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    pub actor_user_id: String,
    pub action: AuditAction,
    pub target_user_id: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form context for the admin panel (changed fields, old/new role)
    #[serde(default)]
    pub metadata: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_format() {
        assert_eq!(
            serde_json::to_string(&AuditAction::CreateUser).unwrap(),
            "\"CREATE_USER\""
        );
        let action: AuditAction = serde_json::from_str("\"DISABLE_USER\"").unwrap();
        assert_eq!(action, AuditAction::DisableUser);
    }
}
