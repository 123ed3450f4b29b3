//! Local filesystem blob store
//!
//! Every upload lands in a single flat directory under a generated name of the
//! form `{unix_millis}-{random}-{sanitized original name}`, so concurrent
//! uploads never collide. The full path is what gets persisted on the file
//! record.

use axum::body::Bytes;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::shared::validation::sanitize_filename;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFoundOnDisk(path),
            StorageError::Io(e) => AppError::Internal(format!("Storage error: {}", e)),
        }
    }
}

/// Outcome of a best-effort blob deletion.
///
/// File deletion never fails because of this; the value exists so callers can
/// log what actually happened on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRemoval {
    Removed,
    AlreadyMissing,
    Failed(String),
}

/// Flat-directory blob store on the local filesystem
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir.clone())
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        info!("Blob store ready at {}", self.root.display());
        Ok(())
    }

    /// Collision-resistant stored name: timestamp, random suffix, sanitized original
    pub fn generate_filename(original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
        format!("{}-{}-{}", millis, suffix, sanitize_filename(original_name))
    }

    /// Write bytes under `filename`, returning the path to persist.
    ///
    /// Fails rather than overwrite an existing blob.
    pub async fn put(&self, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let full_path = self.root.join(filename);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        debug!("Stored {} bytes at {:?}", data.len(), full_path);
        Ok(full_path.to_string_lossy().into_owned())
    }

    /// Read a blob previously returned by [`put`](Self::put)
    pub async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        match fs::read(path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Best-effort delete; errors are reported in the outcome, never raised
    pub async fn remove(&self, path: &str) -> BlobRemoval {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted blob {}", path);
                BlobRemoval::Removed
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BlobRemoval::AlreadyMissing,
            Err(e) => BlobRemoval::Failed(e.to_string()),
        }
    }
}
