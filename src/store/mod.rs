//! File-backed settings persistence
//!
//! Every surface reads its file wholesale, applies a mutation and writes the
//! whole file back. Writers to the same file are serialised in-process.

mod env_file;

pub use env_file::{EnvFile, EnvFileStore};

use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    /// A key or value that cannot be written as a single `KEY=value` line
    #[error("{0}")]
    InvalidEntry(String),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a file, mapping "does not exist" to `None`
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Replace a file's contents via a sibling temp file and rename
pub(crate) async fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// A single JSON document on disk
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; `None` when the file does not exist
    pub async fn read(&self) -> Result<Option<T>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Read the document, writing `default` first when the file is missing
    pub async fn load_or_init(&self, default: impl FnOnce() -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        match self.read_unlocked().await? {
            Some(doc) => Ok(doc),
            None => {
                let doc = default();
                self.write_unlocked(&doc).await?;
                info!("Initialised {} with defaults", self.path.display());
                Ok(doc)
            }
        }
    }

    /// Overwrite the document
    pub async fn write(&self, doc: &T) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_unlocked(doc).await
    }

    /// Read-modify-write under the store lock
    pub async fn update<R>(
        &self,
        default: impl FnOnce() -> T,
        mutate: impl FnOnce(&mut T) -> R,
    ) -> Result<(T, R), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_unlocked().await?.unwrap_or_else(default);
        let result = mutate(&mut doc);
        self.write_unlocked(&doc).await?;
        Ok((doc, result))
    }

    async fn read_unlocked(&self) -> Result<Option<T>, StoreError> {
        let Some(content) = read_optional(&self.path).await? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    async fn write_unlocked(&self, doc: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<String>,
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Doc> = JsonStore::new(dir.path().join("doc.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_or_init_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/doc.json");
        let store: JsonStore<Doc> = JsonStore::new(&path);

        let doc = store
            .load_or_init(|| Doc {
                items: vec!["a".into()],
            })
            .await
            .unwrap();
        assert_eq!(doc.items, vec!["a"]);
        assert!(path.exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"items\""), "document should be pretty-printed");
    }

    #[tokio::test]
    async fn test_update_round_trips() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Doc> = JsonStore::new(dir.path().join("doc.json"));

        let (doc, len) = store
            .update(Doc::default, |d| {
                d.items.push("x".into());
                d.items.len()
            })
            .await
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.read().await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{not json").unwrap();

        let store: JsonStore<Doc> = JsonStore::new(&path);
        assert!(matches!(store.read().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(JsonStore::<Doc>::new(dir.path().join("doc.json")));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(Doc::default, |d| d.items.push(i.to_string()))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.read().await.unwrap().unwrap().items.len(), 10);
    }
}
