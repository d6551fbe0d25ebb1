//! Filesystem capability
//!
//! This module defines the trait the archive writer persists through and the
//! local-disk implementation used in production.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting archive files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for archive persistence backends
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Creates `path` and any missing parents
    async fn ensure_dir(&self, path: &Path) -> StoreResult<()>;

    /// Writes `bytes` to `path`, replacing any existing file
    ///
    /// The parent directory must already exist.
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> StoreResult<()>;

    /// Writes `value` as 2-space indented JSON, replacing any existing file
    async fn write_json<T>(&self, path: &Path, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        bytes.push(b'\n');
        self.write_bytes(path, &bytes).await
    }
}

/// Store writing straight to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[async_trait]
impl ArchiveStore for LocalStore {
    async fn ensure_dir(&self, path: &Path) -> StoreResult<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}
