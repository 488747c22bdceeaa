//! Integration tests for the storage infrastructure
//!
//! These tests exercise the blob-store adapter contract end to end
//! against the in-memory implementation, which is also the production
//! fallback when no bucket is configured.

use common::storage::{BlobStore, MemoryBlobStore, StorageConfig, connect};
use common::{StorageError, StorageResult};
use serial_test::serial;

/// Round-trip a JSON document through the adapter contract
#[tokio::test]
async fn test_blob_store_roundtrip() -> StorageResult<()> {
    let store = MemoryBlobStore::new();

    let key = "cache/sessions/integration-test.json";
    let doc = br#"{"session_id":"integration-test","authenticated":true}"#.to_vec();

    store.put(key, doc.clone()).await?;
    assert_eq!(store.get(key).await?, doc);

    // Overwrite wins
    store.put(key, b"{}".to_vec()).await?;
    assert_eq!(store.get(key).await?, b"{}");

    store.delete(key).await?;
    assert!(matches!(
        store.get(key).await,
        Err(StorageError::NotFound(_))
    ));

    // Deleting again is a no-op, not an error
    store.delete(key).await?;

    Ok(())
}

/// An unconfigured bucket degrades to the in-memory store instead of failing
#[tokio::test]
#[serial]
async fn test_connect_without_bucket_falls_back_to_memory() {
    unsafe {
        std::env::remove_var("AUTH_BUCKET_NAME");
    }

    let config = StorageConfig::from_env();
    assert!(config.bucket.is_empty());

    let store = connect(&config).await;

    // The fallback store must be usable immediately
    store.put("cache/users.json", b"{}".to_vec()).await.unwrap();
    assert_eq!(store.get("cache/users.json").await.unwrap(), b"{}");
}

/// Bucket name is read from the environment
#[tokio::test]
#[serial]
async fn test_storage_config_from_env() {
    unsafe {
        std::env::set_var("AUTH_BUCKET_NAME", "variant-auth-test");
    }

    let config = StorageConfig::from_env();
    assert_eq!(config.bucket, "variant-auth-test");

    unsafe {
        std::env::remove_var("AUTH_BUCKET_NAME");
    }
}
