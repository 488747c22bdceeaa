//! Durable blob storage for the Variant Analytics services
//!
//! This module provides the adapter in front of the durable document
//! store: whole JSON documents keyed by path, read and written in a
//! single attempt with no retries. Two implementations exist: an
//! S3-compatible object store for production and an in-memory map used
//! when no bucket is configured (or reachable) and in tests. In the
//! degraded in-memory mode documents do not survive a process restart
//! and are not visible to sibling instances; that trade-off is preferred
//! over refusing to serve at all.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{StorageError, StorageResult};

/// Configuration for the durable blob store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name; empty means "run on the in-memory fallback"
    pub bucket: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BUCKET_NAME`: bucket holding the auth documents (default: empty, in-memory fallback)
    pub fn from_env() -> Self {
        let bucket = std::env::var("AUTH_BUCKET_NAME").unwrap_or_default();
        StorageConfig { bucket }
    }
}

/// Whole-document blob store.
///
/// Every operation is a single attempt; failures are typed but never
/// retried here.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a document. `NotFound` when the key is absent.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write (or overwrite) a document.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;

    /// Delete a document. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// S3-backed blob store
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store for the given bucket
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Check that the bucket exists and is reachable
    pub async fn health_check(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Unavailable(service_err.to_string())
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.into_service_error().to_string()))?;

        Ok(())
    }
}

/// In-memory blob store
///
/// Process-local fallback used when no bucket is configured, and the
/// backing store for unit tests. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (test observability)
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }

    /// Whether a document exists under the given key
    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.lock().await.contains_key(key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.blobs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        self.blobs.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.blobs.lock().await.remove(key);
        Ok(())
    }
}

/// Connect to the configured blob store
///
/// Probes the configured bucket once; any failure logs a warning and
/// degrades to the in-memory store so that the service keeps working
/// (documents become process-local and ephemeral in that mode).
pub async fn connect(config: &StorageConfig) -> Arc<dyn BlobStore> {
    if config.bucket.is_empty() {
        warn!("No bucket configured, using in-memory blob store");
        return Arc::new(MemoryBlobStore::new());
    }

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = Client::new(&aws_config);
    let store = S3BlobStore::new(client, config.bucket.clone());

    match store.health_check().await {
        Ok(()) => {
            info!("Connected to blob store bucket: {}", config.bucket);
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                "Bucket {} unreachable ({}), falling back to in-memory blob store",
                config.bucket, e
            );
            Arc::new(MemoryBlobStore::new())
        }
    }
}
