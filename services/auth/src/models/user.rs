//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::role::Role;

/// The full user directory, keyed by username, as persisted in
/// `cache/users.json`.
pub type Directory = BTreeMap<String, UserRecord>;

/// Dashboard access grant: either unrestricted (`"all"` on the wire) or
/// an explicit ordered list of dashboard ids.
///
/// Only meaningful for readonly users; admin and super admin are treated
/// as unrestricted regardless of the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAccess {
    All,
    Selected(Vec<String>),
}

impl DashboardAccess {
    /// Whether the grant covers the given dashboard id
    pub fn allows(&self, dashboard_id: &str) -> bool {
        match self {
            DashboardAccess::All => true,
            DashboardAccess::Selected(ids) => ids.iter().any(|id| id == dashboard_id),
        }
    }
}

impl Serialize for DashboardAccess {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DashboardAccess::All => serializer.serialize_str("all"),
            DashboardAccess::Selected(ids) => ids.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DashboardAccess {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Marker(String),
            Selected(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Marker(s) if s == "all" => Ok(DashboardAccess::All),
            Repr::Marker(s) => Err(serde::de::Error::custom(format!(
                "expected \"all\" or a list of dashboard ids, got \"{s}\""
            ))),
            Repr::Selected(ids) => Ok(DashboardAccess::Selected(ids)),
        }
    }
}

/// Per-dashboard app restriction map. An empty map, or a dashboard id
/// absent from it, means unrestricted (default-allow).
pub type AppAccess = BTreeMap<String, Vec<String>>;

/// User directory entry
///
/// Metadata fields are tolerant of absence so directories written by
/// earlier deployments still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Argon2 PHC hash of the user's password
    pub password: String,
    pub role: Role,
    pub name: String,
    pub dashboards: DashboardAccess,
    #[serde(default)]
    pub app_access: AppAccess,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

fn default_created_by() -> String {
    "system".to_string()
}

/// Public attributes of a user, captured into the session at login time.
///
/// Deliberately a snapshot, not a live reference: later directory edits
/// do not propagate into existing sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub username: String,
    pub role: Role,
    pub name: String,
    pub dashboards: DashboardAccess,
    #[serde(default)]
    pub app_access: AppAccess,
}

impl UserSnapshot {
    /// Capture the public attributes of a directory record
    pub fn from_record(username: &str, record: &UserRecord) -> Self {
        Self {
            username: username.to_string(),
            role: record.role,
            name: record.name.clone(),
            dashboards: record.dashboards.clone(),
            app_access: record.app_access.clone(),
        }
    }
}
