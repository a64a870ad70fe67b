//! Filesystem-backed object store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{validate_key, ObjectStore, StorageError, StoredObject};

/// Stores each object as a file under `root`, mirroring the key's path.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create the store, creating `root` if it does not exist.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write to a sibling temp file first so readers never see a partial object.
        let tmp = path.with_extension("partial");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(key, size = bytes.len(), "Stored object on local disk");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(StoredObject {
                bytes,
                content_type: None,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        store
            .put("bedrift/1/stoffkartotek/4/ab-sds.pdf", b"%PDF".to_vec(), "application/pdf")
            .await
            .unwrap();

        assert!(dir.path().join("bedrift/1/stoffkartotek/4/ab-sds.pdf").is_file());
        let obj = store.get("bedrift/1/stoffkartotek/4/ab-sds.pdf").await.unwrap();
        assert_eq!(obj.bytes, b"%PDF");
    }

    #[tokio::test]
    async fn missing_object_is_not_found_and_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.get("nope/file.txt").await,
            Err(StorageError::NotFound(_))
        ));
        store.delete("nope/file.txt").await.unwrap();
    }

    #[tokio::test]
    async fn overwrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        store.put("k.txt", b"one".to_vec(), "text/plain").await.unwrap();
        store.put("k.txt", b"two".to_vec(), "text/plain").await.unwrap();
        assert_eq!(store.get("k.txt").await.unwrap().bytes, b"two");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        assert!(matches!(
            store.put("../escape.txt", vec![1], "text/plain").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
