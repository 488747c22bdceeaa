//! Custom error types for the common library
//!
//! This module defines the storage-error taxonomy shared by every blob
//! store implementation. Callers above the adapter convert these into
//! `Option`/boolean sentinels; no storage error is ever shown to an end
//! user.

use thiserror::Error;

/// Custom error type for durable blob storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store is unreachable or not configured
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The requested document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document exists but could not be decoded
    #[error("Malformed document {key}: {reason}")]
    Malformed { key: String, reason: String },
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
