//! Storage module for report attachments
//!
//! Defines the [`ObjectStorage`] seam used by the attachment pipeline and its
//! MinIO/S3-compatible implementation.

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// Blob storage consumed by the attachment pipeline
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `path` (relative to the public prefix) and return
    /// the object key together with its publicly resolvable URL.
    async fn put_public(&self, path: &str, data: Vec<u8>, content_type: &str)
        -> Result<StoredObject>;

    /// Remove an object by key
    async fn delete(&self, key: &str) -> Result<()>;

    /// Recover the object key from a URL produced by [`ObjectStorage::put_public`]
    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// Location of an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}
