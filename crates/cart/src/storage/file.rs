//! Directory-backed key-value store.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::{fs, task};
use tracing::{debug, instrument};

use super::{KeyValueStore, StorageError};

/// Stores each key as `<dir>/<sanitized key>.json`.
///
/// Writes land in a uniquely named temp file in the same directory and are
/// renamed into place, so readers never observe a half-written value and
/// concurrent writers (even from other processes) never share a temp file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a key to its file path.
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if name.is_empty() || name.chars().all(|c| c == '.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{name}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let value = value.to_owned();

        task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_path_for_sanitizes_key() {
        let store = FileStore::new("/data");
        let path = store.path_for("@RocketShoes:cart").unwrap();
        assert_eq!(path, PathBuf::from("/data/_RocketShoes_cart.json"));
    }

    #[test]
    fn test_path_for_rejects_dot_keys() {
        let store = FileStore::new("/data");
        assert!(matches!(
            store.path_for(""),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.path_for(".."),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_path_for_cannot_escape_dir() {
        let store = FileStore::new("/data");
        let path = store.path_for("../etc/passwd").unwrap();
        assert_eq!(path.parent().unwrap(), Path::new("/data"));
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get_item("@RocketShoes:cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_dir_and_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set_item("@RocketShoes:cart", "[1]").await.unwrap();
        store.set_item("@RocketShoes:cart", "[2]").await.unwrap();

        assert_eq!(
            store.get_item("@RocketShoes:cart").await.unwrap().as_deref(),
            Some("[2]")
        );
        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_collide() {
        let dir = tempdir().unwrap();

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = FileStore::new(dir.path());
                tokio::spawn(async move {
                    store
                        .set_item("@RocketShoes:cart", &format!("[{i}]"))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let stored = FileStore::new(dir.path())
            .get_item("@RocketShoes:cart")
            .await
            .unwrap()
            .unwrap();
        let value: Vec<u32> = serde_json::from_str(&stored).unwrap();
        assert_eq!(value.len(), 1);
        assert!(value[0] < 16);

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set_item("key", "value").await.unwrap();
        store.remove_item("key").await.unwrap();
        store.remove_item("key").await.unwrap();

        assert_eq!(store.get_item("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_new_instance() {
        let dir = tempdir().unwrap();
        FileStore::new(dir.path())
            .set_item("key", "persisted")
            .await
            .unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(
            reopened.get_item("key").await.unwrap().as_deref(),
            Some("persisted")
        );
    }
}
