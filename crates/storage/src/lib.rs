//! Object storage for uploaded files (task attachments, safety data sheets).
//!
//! The [`ObjectStore`] trait abstracts over three backends:
//!
//! - [`S3Store`]: any S3-compatible service (AWS, MinIO).
//! - [`LocalStore`]: a directory on the local filesystem.
//! - [`MemoryStore`]: an in-process map, used by tests.
//!
//! Keys are `/`-separated relative paths such as
//! `bedrift/1/oppgaver/7/3f2a…-plan.pdf`.

pub mod local;
pub mod memory;
pub mod s3;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// An object read back from storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    /// Content type recorded by the backend, when it keeps one.
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Read the object stored under `key`.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Delete the object under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Generate the unique component placed in front of stored file names.
pub fn unique_prefix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Reject keys that could escape the storage root or are malformed.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default directory for the local backend.
const DEFAULT_STORAGE_DIR: &str = "storage";

/// Default region for S3-compatible services.
const DEFAULT_S3_REGION: &str = "eu-north-1";

/// S3 connection settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO etc.); enables path-style addressing.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Which backend to construct.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    S3(S3Config),
    Local { root: PathBuf },
    Memory,
}

impl StorageConfig {
    /// Load from environment variables.
    ///
    /// | Variable               | Default       |
    /// |------------------------|---------------|
    /// | `S3_BUCKET`            | unset → local |
    /// | `S3_REGION`            | `eu-north-1`  |
    /// | `S3_ENDPOINT`          |               |
    /// | `S3_ACCESS_KEY_ID`     |               |
    /// | `S3_SECRET_ACCESS_KEY` |               |
    /// | `STORAGE_DIR`          | `storage`     |
    pub fn from_env() -> Self {
        match std::env::var("S3_BUCKET") {
            Ok(bucket) if !bucket.trim().is_empty() => Self::S3(S3Config {
                bucket,
                region: std::env::var("S3_REGION")
                    .unwrap_or_else(|_| DEFAULT_S3_REGION.to_string()),
                endpoint: std::env::var("S3_ENDPOINT").ok(),
                access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
            }),
            _ => Self::Local {
                root: PathBuf::from(
                    std::env::var("STORAGE_DIR").unwrap_or_else(|_| DEFAULT_STORAGE_DIR.into()),
                ),
            },
        }
    }
}

/// Construct the configured backend.
pub async fn build_store(config: StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::S3(s3) => Arc::new(S3Store::connect(s3).await),
        StorageConfig::Local { root } => Arc::new(LocalStore::new(root).await?),
        StorageConfig::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(backend = store.backend_name(), "Object storage initialized");
    Ok(store)
}
