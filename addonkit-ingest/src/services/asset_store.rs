//! Managed asset storage
//!
//! Companion files are copied into a project-owned directory under
//! deterministic names. Paths handed back are relative to the store root.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Asset storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Source file could not be read or copied
    #[error("Copy {src} failed: {source}")]
    Copy {
        src: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Managed file could not be removed
    #[error("Delete {path} failed: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<StorageError> for addonkit_common::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Copy { source, .. } | StorageError::Delete { source, .. } => {
                addonkit_common::Error::Io(source)
            }
        }
    }
}

/// Project asset directory
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored path
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Whether `path` refers to a file inside this store
    pub fn is_managed(&self, path: &Path) -> bool {
        path.is_relative() || path.starts_with(&self.root)
    }

    /// Copy `src` into the store as `{stem}.{ext}`, replacing any existing copy
    ///
    /// The copy is written to a unique temporary sibling and renamed over the
    /// destination, so a reader never observes a half-written file.
    pub async fn copy_with_replace(&self, src: &Path, stem: &str) -> Result<PathBuf, StorageError> {
        let file_name = match src.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.to_string(),
        };
        let destination = self.root.join(&file_name);
        let temporary = self.root.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let copy_err = |source: io::Error| StorageError::Copy {
            src: src.to_path_buf(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(copy_err)?;
        if let Err(e) = tokio::fs::copy(src, &temporary).await {
            let _ = tokio::fs::remove_file(&temporary).await;
            return Err(copy_err(e));
        }
        if let Err(e) = tokio::fs::rename(&temporary, &destination).await {
            let _ = tokio::fs::remove_file(&temporary).await;
            return Err(copy_err(e));
        }

        tracing::debug!(
            src = %src.display(),
            dest = %destination.display(),
            "Copied file into managed assets"
        );
        Ok(PathBuf::from(file_name))
    }

    /// Remove a managed file; files outside the store are never touched
    ///
    /// Returns `Ok(false)` when nothing was removed.
    pub fn remove(&self, path: &Path) -> Result<bool, StorageError> {
        if !self.is_managed(path) {
            return Ok(false);
        }

        let full = if path.is_relative() {
            self.resolve(path)
        } else {
            path.to_path_buf()
        };

        match std::fs::remove_file(&full) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Delete { path: full, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_uses_deterministic_name_and_replaces() {
        let temp = TempDir::new().unwrap();
        let store = AssetStore::new(temp.path().join("assets"));
        let src = temp.path().join("jbib_000_u.yld");
        std::fs::write(&src, b"first").unwrap();

        let stored = store.copy_with_replace(&src, "abc_cloth").await.unwrap();
        assert_eq!(stored, PathBuf::from("abc_cloth.yld"));

        std::fs::write(&src, b"second").unwrap();
        store.copy_with_replace(&src, "abc_cloth").await.unwrap();

        let content = std::fs::read(store.resolve(&stored)).unwrap();
        assert_eq!(content, b"second");

        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let store = AssetStore::new(temp.path());
        let result = store
            .copy_with_replace(&temp.path().join("missing.ydd"), "x_firstperson")
            .await;
        assert!(matches!(result, Err(StorageError::Copy { .. })));
    }

    #[test]
    fn test_remove_only_touches_managed_files() {
        let temp = TempDir::new().unwrap();
        let store = AssetStore::new(temp.path().join("assets"));
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(store.root().join("a.ydd"), b"x").unwrap();

        let outside = temp.path().join("outside.ydd");
        std::fs::write(&outside, b"x").unwrap();

        assert!(store.remove(Path::new("a.ydd")).unwrap());
        assert!(!store.remove(Path::new("a.ydd")).unwrap());
        assert!(!store.remove(&outside).unwrap());
        assert!(outside.exists());
    }
}
