//! User directory repository
//!
//! Serves the full user directory with bounded staleness and applies
//! mutations write-through: every update lands in the process-local
//! cache first (same-process readers observe it immediately) and is then
//! persisted best-effort to the durable store. Across instances the only
//! propagation path is the durable store plus cache expiry, so a change
//! becomes visible elsewhere within the freshness window at the latest.
//! Concurrent updates from different instances are last-writer-wins;
//! administrative writes are rare and operator-driven, which makes that
//! acceptable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use common::{BlobStore, StorageError};

use crate::models::{DashboardAccess, Directory, Role, UserRecord};
use crate::password::hash_password;

/// Key of the user directory document
pub const USERS_KEY: &str = "cache/users.json";

struct CacheSlot {
    directory: Directory,
    loaded_at: Instant,
}

/// Cached read-through view of the user directory
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn BlobStore>,
    cache: Arc<RwLock<Option<CacheSlot>>>,
    freshness: Duration,
}

impl UserDirectory {
    /// Create a new directory repository over the given store.
    ///
    /// `freshness` is how long a cached copy is served before the durable
    /// store is consulted again.
    pub fn new(store: Arc<dyn BlobStore>, freshness: Duration) -> Self {
        Self {
            store,
            cache: Arc::new(RwLock::new(None)),
            freshness,
        }
    }

    /// Get the current directory.
    ///
    /// Priority: fresh cache → durable store → built-in default set. The
    /// default set is persisted on first use, so this never returns an
    /// empty directory and never fails.
    pub async fn load(&self) -> Directory {
        {
            let cache = self.cache.read().await;
            if let Some(slot) = cache.as_ref() {
                if slot.loaded_at.elapsed() < self.freshness {
                    return slot.directory.clone();
                }
            }
        }

        if let Some(directory) = self.load_from_store().await {
            self.fill_cache(directory.clone()).await;
            return directory;
        }

        let directory = default_directory();
        info!("Seeding user directory with built-in defaults");
        self.save_to_store(&directory).await;
        self.fill_cache(directory.clone()).await;
        directory
    }

    /// Replace the directory.
    ///
    /// The cache is written before this returns; the durable save is best
    /// effort and its success is the return value.
    pub async fn update(&self, directory: Directory) -> bool {
        self.fill_cache(directory.clone()).await;
        self.save_to_store(&directory).await
    }

    /// Drop the cached copy; the next [`load`](Self::load) goes back to
    /// the durable store.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Record a successful login on the user's directory entry (best
    /// effort).
    pub async fn touch_last_login(&self, username: &str) {
        let mut directory = self.load().await;
        if let Some(record) = directory.get_mut(username) {
            record.last_login = Some(Utc::now());
            self.update(directory).await;
        }
    }

    async fn fill_cache(&self, directory: Directory) {
        *self.cache.write().await = Some(CacheSlot {
            directory,
            loaded_at: Instant::now(),
        });
    }

    async fn load_from_store(&self) -> Option<Directory> {
        match self.store.get(USERS_KEY).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(directory) => Some(directory),
                Err(e) => {
                    warn!("User directory document is malformed: {}", e);
                    None
                }
            },
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                warn!("Failed to load user directory: {}", e);
                None
            }
        }
    }

    async fn save_to_store(&self, directory: &Directory) -> bool {
        let bytes = match serde_json::to_vec_pretty(directory) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode user directory: {}", e);
                return false;
            }
        };
        match self.store.put(USERS_KEY, bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist user directory: {}", e);
                false
            }
        }
    }
}

/// Built-in default directory: one super admin and one readonly demo
/// account, used when the durable store has no directory yet.
pub fn default_directory() -> Directory {
    let mut directory = Directory::new();
    directory.insert(
        "admin".to_string(),
        seed_record("admin123", Role::SuperAdmin, "Administrator", DashboardAccess::All),
    );
    directory.insert(
        "viewer".to_string(),
        seed_record(
            "viewer123",
            Role::Readonly,
            "Viewer User",
            DashboardAccess::Selected(vec!["icarus_historical".to_string()]),
        ),
    );
    directory
}

fn seed_record(
    password: &str,
    role: Role,
    name: &str,
    dashboards: DashboardAccess,
) -> UserRecord {
    // An empty hash never verifies, so a hashing failure locks the seed
    // account instead of panicking the service.
    let password = hash_password(password).unwrap_or_else(|e| {
        error!("Failed to hash seed password: {}", e);
        String::new()
    });
    UserRecord {
        password,
        role,
        name: name.to_string(),
        dashboards,
        app_access: Default::default(),
        is_active: true,
        created_at: Some(Utc::now()),
        created_by: "system".to_string(),
        updated_at: None,
        updated_by: None,
        last_login: None,
    }
}
