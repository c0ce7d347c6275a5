use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{public_url, BlobStore, StorageError};

/// Writes blobs below a directory that something else serves at
/// `public_base_url`.
pub struct LocalStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self { root, public_base_url }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn put(&self, bytes: Bytes, key: &str, _content_type: &str) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!("Stored {} ({} bytes)", path.display(), bytes.len());
        Ok(public_url(&self.public_base_url, key))
    }

    async fn check(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let metadata = tokio::fs::metadata(&self.root).await?;
        if metadata.permissions().readonly() {
            return Err(StorageError::Unavailable(format!("{} is read-only", self.root.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_below_root() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path().to_path_buf(), "https://media.example/".into());

        let url = store
            .put(Bytes::from_static(b"jpeg"), "thumbnails/2025-01-01/a.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "https://media.example/thumbnails/2025-01-01/a.jpg");
        assert_eq!(
            std::fs::read(root.path().join("thumbnails/2025-01-01/a.jpg")).unwrap(),
            b"jpeg"
        );
        assert!(store.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_keys() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path().to_path_buf(), "https://media.example".into());

        for key in ["../outside.jpg", "/etc/passwd", ""] {
            assert!(matches!(
                store.put(Bytes::from_static(b"x"), key, "image/jpeg").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
