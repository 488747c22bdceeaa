//! Audit log repository
//!
//! Append-only list of administrative actions, persisted as a single
//! JSON array capped at the most recent 500 entries. Storage failures
//! degrade to an empty (or unpersisted) log; auditing never blocks an
//! administrative action.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use common::{BlobStore, StorageError};

use crate::models::{AuditAction, AuditEntry};

/// Key of the audit log document
pub const AUDIT_LOG_KEY: &str = "cache/audit_log.json";

/// Maximum number of retained entries; oldest are dropped first
pub const MAX_ENTRIES: usize = 500;

/// Blob-backed capped audit log
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn BlobStore>,
}

impl AuditLog {
    /// Create a new audit log over the given blob store
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Load the full retained log, oldest first
    pub async fn load(&self) -> Vec<AuditEntry> {
        match self.store.get(AUDIT_LOG_KEY).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Audit log document is malformed: {}", e);
                    Vec::new()
                }
            },
            Err(StorageError::NotFound(_)) => Vec::new(),
            Err(e) => {
                warn!("Failed to load audit log: {}", e);
                Vec::new()
            }
        }
    }

    /// Append one entry and persist the capped log (best effort).
    ///
    /// Entry ids continue from the current tail rather than restarting,
    /// so they stay unique within the retained window even after the cap
    /// has dropped older entries.
    pub async fn record(
        &self,
        actor_user_id: &str,
        action: AuditAction,
        target_user_id: &str,
        metadata: Value,
    ) -> AuditEntry {
        let mut entries = self.load().await;

        let next_id = entries.last().map_or(1, |e| e.id + 1);
        let entry = AuditEntry {
            id: next_id,
            actor_user_id: actor_user_id.to_string(),
            action,
            target_user_id: target_user_id.to_string(),
            timestamp: Utc::now(),
            metadata,
        };
        entries.push(entry.clone());

        if entries.len() > MAX_ENTRIES {
            let drop = entries.len() - MAX_ENTRIES;
            entries.drain(..drop);
        }

        self.save(&entries).await;
        entry
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.load().await;
        entries.into_iter().rev().take(limit).collect()
    }

    async fn save(&self, entries: &[AuditEntry]) {
        let bytes = match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode audit log: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.put(AUDIT_LOG_KEY, bytes).await {
            warn!("Failed to persist audit log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MemoryBlobStore;
    use serde_json::json;

    fn log() -> AuditLog {
        AuditLog::new(Arc::new(MemoryBlobStore::new()))
    }

    #[tokio::test]
    async fn test_record_and_recent_order() {
        let audit = log();

        audit
            .record("root", AuditAction::CreateUser, "viewer", json!({"role": "readonly"}))
            .await;
        audit
            .record("root", AuditAction::DisableUser, "viewer", Value::Null)
            .await;

        let recent = audit.recent(10).await;
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].action, AuditAction::DisableUser);
        assert_eq!(recent[1].action, AuditAction::CreateUser);
        assert_eq!(recent[1].metadata["role"], "readonly");
    }

    #[tokio::test]
    async fn test_cap_drops_oldest() {
        let audit = log();

        for i in 0..(MAX_ENTRIES + 25) {
            audit
                .record("root", AuditAction::UpdateUser, &format!("u{i}"), Value::Null)
                .await;
        }

        let entries = audit.load().await;
        assert_eq!(entries.len(), MAX_ENTRIES);
        // The first 25 entries were dropped
        assert_eq!(entries[0].target_user_id, "u25");
        // Ids keep increasing past the cap
        assert_eq!(entries.last().unwrap().id as usize, MAX_ENTRIES + 25);
    }

    #[tokio::test]
    async fn test_empty_log_reads_as_empty() {
        let audit = log();
        assert!(audit.load().await.is_empty());
        assert!(audit.recent(5).await.is_empty());
    }
}
