//! Single-slot persistent store for the live preview document.
//!
//! # Responsibilities
//! - Read the current document from disk
//! - Replace it wholesale
//! - Create it from a default at startup when absent
//!
//! # Design Decisions
//! - Replace writes a temporary sibling file and renames it over the target,
//!   so a concurrent read sees the old or the new document in full
//! - Writers are serialized; readers take no lock
//! - Last committed write wins

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True when the document simply has not been created yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Holds the preview document at a fixed path.
#[derive(Debug)]
pub struct ContentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document.
    pub async fn read(&self) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(&self.path).await.map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the document with `document`. Never merges or appends.
    pub async fn replace(&self, document: impl AsRef<[u8]>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_atomic(document.as_ref()).await
    }

    /// Write `default` if no document exists. Returns true when it was created.
    pub async fn ensure_exists(&self, default: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(false),
            Ok(false) => {
                if let Some(parent) = self.parent_dir() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| self.write_error(source))?;
                }
                self.write_atomic(default.as_bytes()).await?;
                Ok(true)
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        if let Err(source) = tokio::fs::write(&tmp, bytes).await {
            self.discard(&tmp).await;
            return Err(self.write_error(source));
        }
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            self.discard(&tmp).await;
            return Err(self.write_error(source));
        }
        tracing::debug!(path = ?self.path, bytes = bytes.len(), "Preview document replaced");
        Ok(())
    }

    async fn discard(&self, tmp: &Path) {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = ?tmp, error = %e, "Failed to remove temporary file");
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "preview".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("preview.html"));
        let err = store.read().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_replace_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("preview.html"));

        store.replace("<h1>one</h1>").await.unwrap();
        assert_eq!(store.read().await.unwrap(), b"<h1>one</h1>");

        // Shorter document must not leave a tail of the previous one.
        store.replace("<p>2</p>").await.unwrap();
        assert_eq!(store.read().await.unwrap(), b"<p>2</p>");
    }

    #[tokio::test]
    async fn test_replace_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("preview.html"));
        store.replace("x").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_exists_only_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("nested/preview.html"));

        assert!(store.ensure_exists("default").await.unwrap());
        store.replace("custom").await.unwrap();
        assert!(!store.ensure_exists("default").await.unwrap());
        assert_eq!(store.read().await.unwrap(), b"custom");
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("missing/preview.html"));
        let err = store.replace("x").await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_replaces_last_one_wins_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ContentStore::new(dir.path().join("preview.html")));
        let docs: Vec<String> = (0..16).map(|i| format!("<p>{}</p>", "x".repeat(i * 100))).collect();

        let mut handles = Vec::new();
        for doc in docs.clone() {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.replace(doc).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let stored = String::from_utf8(store.read().await.unwrap()).unwrap();
        assert!(docs.contains(&stored), "stored document must be one complete write");
    }
}
