//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSnapshot;

/// Session record, one JSON document per session id under
/// `cache/sessions/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Snapshot of the user at login time; never refreshed afterwards
    pub user: UserSnapshot,
    /// Always true for records that exist
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
}

impl SessionRecord {
    /// Whether the session has passed its expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
