use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;

use crate::error::StoreError;
use crate::provider::ObjectStore;

/// Bodies are written here first and renamed into place once complete.
const STAGING_DIR: &str = ".bucketdrop-staging";

/// Filesystem-backed object store for running without cloud credentials.
///
/// Keys are relative paths under `base_path`; `/` in a key becomes a
/// directory level. A put either replaces the whole object or leaves the
/// previous one untouched.
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(base_path.join(STAGING_DIR))?;
        Ok(Self {
            base_path: base_path.to_path_buf(),
        })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        let reserved = relative
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == STAGING_DIR);
        if key.is_empty() || key.ends_with('/') || escapes || reserved {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

fn collect_keys(dir: &Path, rel: &str, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if rel.is_empty() && name == STAGING_DIR {
            continue;
        }
        let key = if rel.is_empty() {
            name
        } else {
            format!("{rel}/{name}")
        };
        if entry.file_type()?.is_dir() {
            collect_keys(&entry.path(), &key, out)?;
        } else {
            out.push(key);
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, mut body: File) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging_dir = self.base_path.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_dir).await?;
        let staged = tempfile::NamedTempFile::new_in(&staging_dir)?;
        let mut dest = File::from_std(staged.as_file().try_clone()?);
        let written = tokio::io::copy(&mut body, &mut dest).await?;
        dest.sync_all().await?;
        drop(dest);

        staged.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        tracing::debug!(key, size_bytes = written, path = %path.display(), "object written");
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), StoreError> {
        if !self.base_path.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("base path does not exist: {}", self.base_path.display()),
            )));
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        if self.base_path.exists() {
            collect_keys(&self.base_path, "", &mut keys)?;
        }
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};
    use tempfile::TempDir;

    async fn staged(data: &[u8]) -> File {
        let mut f = tempfile::tempfile().unwrap();
        f.write_all(data).unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        File::from_std(f)
    }

    #[tokio::test]
    async fn put_then_list() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();

        store
            .put("uploads/b.txt", staged(b"bravo").await)
            .await
            .unwrap();
        store
            .put("uploads/a.txt", staged(b"alpha").await)
            .await
            .unwrap();
        store.put("other/c.txt", staged(b"c").await).await.unwrap();

        let keys = store.list("uploads/").await.unwrap();
        assert_eq!(keys, vec!["uploads/a.txt", "uploads/b.txt"]);

        let written = std::fs::read(tmp.path().join("uploads/a.txt")).unwrap();
        assert_eq!(written, b"alpha");
    }

    #[tokio::test]
    async fn put_overwrites_existing_object() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();

        store.put("uploads/r.pdf", staged(b"first").await).await.unwrap();
        store.put("uploads/r.pdf", staged(b"second").await).await.unwrap();

        assert_eq!(store.list("uploads/").await.unwrap(), vec!["uploads/r.pdf"]);
        let written = std::fs::read(tmp.path().join("uploads/r.pdf")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn failed_put_keeps_previous_object() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();
        store.put("uploads/r.txt", staged(b"good").await).await.unwrap();

        // A write-only handle fails on the first read.
        let unreadable = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp.path().join("write-only"))
            .unwrap();
        let result = store.put("uploads/r.txt", File::from_std(unreadable)).await;
        assert!(result.is_err());

        let stored = std::fs::read(tmp.path().join("uploads/r.txt")).unwrap();
        assert_eq!(stored, b"good");
        let staging_left = std::fs::read_dir(tmp.path().join(STAGING_DIR)).unwrap().count();
        assert_eq!(staging_left, 0);
    }

    #[tokio::test]
    async fn staging_area_is_not_listed_or_writable() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();
        store.put("a.txt", staged(b"a").await).await.unwrap();

        assert_eq!(store.list("").await.unwrap(), vec!["a.txt"]);
        let key = format!("{STAGING_DIR}/x");
        let err = store.put(&key, staged(b"x").await).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_connection_ok() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();
        store.test_connection().await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_fails_when_base_removed() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("store");
        let store = LocalObjectStore::new(&base).unwrap();
        std::fs::remove_dir_all(&base).unwrap();
        assert!(store.test_connection().await.is_err());
    }

    #[tokio::test]
    async fn list_empty_prefix_returns_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path()).unwrap();
        assert!(store.list("uploads/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keys_escaping_base_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(&tmp.path().join("store")).unwrap();

        for key in ["uploads/../../etc/passwd", "/abs", "uploads/", ""] {
            let err = store.put(key, staged(b"x").await).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "{key}");
        }
        assert!(!tmp.path().join("etc").exists());
    }
}
