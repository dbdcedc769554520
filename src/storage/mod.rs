//! Blob storage for uploaded source documents (§4.1, §5).
//!
//! Ingested files are written once to a local directory keyed by job id and
//! read back by the OCR stage; the worker deletes the blob once a job reaches
//! a terminal state (succeeded or permanently failed). Grounded in the
//! teacher's `storage/` module, rebased from `object_store` onto the local
//! filesystem since this pipeline runs single-node with an embedded ledger
//! and queue rather than against object storage.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after a blob is written.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Local-filesystem blob store rooted at `ServerConfig::blob_dir`.
#[derive(Clone)]
pub struct StorageClient {
    root: PathBuf,
}

impl StorageClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at a fresh temp directory, for tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(std::env::temp_dir().join(format!("docflow-storage-test-{}", uuid::Uuid::new_v4())))
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Write bytes under `key`, creating parent directories as needed.
    /// Returns the absolute path the bytes were written to, which becomes
    /// `JobTicket::file_path`.
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<UploadMetadata> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        }
        let size = data.len();
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(key, size, path = %path.display(), "Wrote blob to storage");

        Ok(UploadMetadata {
            key: key.to_string(),
            path,
            size,
        })
    }

    /// Read bytes back by key (relative to the storage root).
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.read_path(&self.resolve(key)).await
    }

    /// Read bytes from an absolute path, as produced by `upload`/stored in a
    /// `JobTicket`.
    pub async fn read_path(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path).await {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), size = bytes.len(), "Read blob from storage");
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(fs::try_exists(self.resolve(key)).await?)
    }

    /// Remove a blob once its job reaches a terminal state. Missing files are
    /// not an error: cleanup may race a manual delete or already have run.
    pub async fn delete_path(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrips_bytes_through_a_key() {
        let store = StorageClient::in_memory();
        let meta = store.upload("jobs/j1/invoice.pdf", b"hello".to_vec()).await.unwrap();
        assert_eq!(meta.size, 5);

        let back = store.download("jobs/j1/invoice.pdf").await.unwrap();
        assert_eq!(back, b"hello");
        assert!(store.exists("jobs/j1/invoice.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn download_missing_key_is_not_found() {
        let store = StorageClient::in_memory();
        let err = store.download("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_path_is_idempotent() {
        let store = StorageClient::in_memory();
        let meta = store.upload("jobs/j2/scan.png", b"x".to_vec()).await.unwrap();
        store.delete_path(&meta.path).await.unwrap();
        store.delete_path(&meta.path).await.unwrap();
        assert!(!store.exists("jobs/j2/scan.png").await.unwrap());
    }
}
