// Storage layer - Blob storage boundary for attachment bytes
pub mod local;

use async_trait::async_trait;

use crate::errors::internal::StorageError;

pub use local::LocalBlobStore;

/// Opaque file storage; callers only ever see locators
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return a locator for them
    async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, StorageError>;

    /// Size in bytes of the blob at `locator`
    async fn size(&self, locator: &str) -> Result<u64, StorageError>;

    /// Remove the blob at `locator`; a missing blob is not an error
    async fn delete(&self, locator: &str) -> Result<(), StorageError>;
}
