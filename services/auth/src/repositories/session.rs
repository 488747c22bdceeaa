//! Session record repository
//!
//! Raw CRUD for session documents, one JSON blob per session id. All
//! storage failures are absorbed here: reads degrade to "not found" and
//! writes report success/failure, matching the fail-soft contract of the
//! adapter. Expiry semantics live one layer up, in the session manager.

use std::sync::Arc;

use tracing::warn;

use common::{BlobStore, StorageError};

use crate::models::SessionRecord;

/// Key prefix for session documents
pub const SESSIONS_PREFIX: &str = "cache/sessions/";

/// Blob-backed session record store
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn BlobStore>,
}

impl SessionStore {
    /// Create a new session store over the given blob store
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Document key for a session id
    pub fn key(session_id: &str) -> String {
        format!("{SESSIONS_PREFIX}{session_id}.json")
    }

    /// Load a session record; `None` when absent, malformed, or the
    /// store is unreachable.
    pub async fn load(&self, session_id: &str) -> Option<SessionRecord> {
        match self.store.get(&Self::key(session_id)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Session {} is malformed: {}", session_id, e);
                    None
                }
            },
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                warn!("Failed to load session {}: {}", session_id, e);
                None
            }
        }
    }

    /// Persist a session record (best effort)
    pub async fn save(&self, record: &SessionRecord) -> bool {
        let bytes = match serde_json::to_vec(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode session {}: {}", record.session_id, e);
                return false;
            }
        };
        match self.store.put(&Self::key(&record.session_id), bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save session {}: {}", record.session_id, e);
                false
            }
        }
    }

    /// Delete a session record. Deleting an absent id is a no-op.
    pub async fn delete(&self, session_id: &str) -> bool {
        match self.store.delete(&Self::key(session_id)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to delete session {}: {}", session_id, e);
                false
            }
        }
    }
}
