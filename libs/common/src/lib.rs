//! Common library for the Variant Analytics services
//!
//! This crate provides shared infrastructure used across the Variant
//! Analytics services: the durable blob-store adapter (S3-compatible
//! object store with an in-memory fallback) and the storage error
//! taxonomy.

pub mod error;
pub mod storage;

pub use error::{StorageError, StorageResult};
pub use storage::{BlobStore, MemoryBlobStore, S3BlobStore, StorageConfig};
