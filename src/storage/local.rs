use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::BlobStore;
use crate::errors::internal::StorageError;

/// Files under `<root>/ticket_attachments/YYYY/MM/DD/`
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Final path component with anything outside `[A-Za-z0-9._-]` replaced
    fn sanitize(suggested_name: &str) -> String {
        let base = Path::new(suggested_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        let cleaned: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();

        if cleaned.trim_matches('.').is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(locator);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::MissingBlob(locator.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, StorageError> {
        let dated_dir = format!("ticket_attachments/{}", Utc::now().format("%Y/%m/%d"));
        let locator = format!("{}/{}_{}", dated_dir, Uuid::new_v4().simple(), Self::sanitize(suggested_name));

        tokio::fs::create_dir_all(self.root.join(&dated_dir))
            .await
            .map_err(|e| StorageError::io("create_attachment_dir", e))?;
        tokio::fs::write(self.root.join(&locator), bytes)
            .await
            .map_err(|e| StorageError::io("write_attachment", e))?;

        tracing::debug!("Stored {} bytes at {}", bytes.len(), locator);

        Ok(locator)
    }

    async fn size(&self, locator: &str) -> Result<u64, StorageError> {
        let path = self.resolve(locator)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::MissingBlob(locator.to_string()))
            }
            Err(e) => Err(StorageError::io("stat_attachment", e)),
        }
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let path = self.resolve(locator)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("delete_attachment", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_then_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let locator = store.store(b"hello world", "notes.txt").await.unwrap();

        assert!(locator.starts_with("ticket_attachments/"));
        assert!(locator.ends_with("_notes.txt"));
        assert_eq!(store.size(&locator).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let locator = store.store(b"draft", "report.pdf").await.unwrap();
        store.delete(&locator).await.unwrap();

        match store.size(&locator).await {
            Err(StorageError::MissingBlob(missing)) => assert_eq!(missing, locator),
            other => panic!("Expected MissingBlob, got {:?}", other),
        }
        assert!(store.delete(&locator).await.is_ok());
    }

    #[tokio::test]
    async fn test_same_name_gets_distinct_locators() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let first = store.store(b"a", "scan.png").await.unwrap();
        let second = store.store(b"bb", "scan.png").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.size(&second).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_suggested_name_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let locator = store.store(b"x", "../../etc/pass wd.txt").await.unwrap();

        assert!(!locator.contains(".."));
        assert!(locator.ends_with("_pass_wd.txt"));
    }

    #[tokio::test]
    async fn test_missing_and_hostile_locators() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        match store.size("ticket_attachments/none.pdf").await {
            Err(StorageError::MissingBlob(_)) => {}
            other => panic!("Expected MissingBlob, got: {:?}", other),
        }
        match store.size("../outside.pdf").await {
            Err(StorageError::MissingBlob(_)) => {}
            other => panic!("Expected MissingBlob, got: {:?}", other),
        }
    }
}
