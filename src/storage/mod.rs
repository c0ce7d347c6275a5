mod error;
mod gcs;
mod local;
#[cfg(test)]
mod memory;

pub use error::StorageError;
pub use gcs::GcsStore;
pub use local::LocalStore;
#[cfg(test)]
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::config::StorageConfig;

/// Object storage that hands back a public URL for every stored blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn put(&self, bytes: Bytes, key: &str, content_type: &str) -> Result<String, StorageError>;

    async fn check(&self) -> Result<(), StorageError>;
}

pub fn build_blob_store(config: &StorageConfig) -> Option<Arc<dyn BlobStore>> {
    match config {
        StorageConfig::Inline => {
            info!("No storage configured; thumbnails will be inlined");
            None
        }
        StorageConfig::Gcs {
            bucket,
            credentials,
            public_base_url,
        } => {
            info!("Using GCS bucket {} ({:?} credentials)", bucket, credentials);
            let store = GcsStore::new(bucket.clone(), public_base_url.clone());
            Some(Arc::new(store))
        }
        StorageConfig::Local { root, public_base_url } => {
            info!("Storing thumbnails under {}", root.display());
            Some(Arc::new(LocalStore::new(root.clone(), public_base_url.clone())))
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// `thumbnails/<date>/<media key>-<content hash>.<ext>`; identical bytes for the
/// same post map to the same key.
pub fn object_key(media_key: &str, bytes: &[u8], content_type: &str, now: DateTime<Utc>) -> String {
    let digest = Sha256::digest(bytes);
    let hash: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();

    format!(
        "thumbnails/{}/{}-{}.{}",
        now.format("%Y-%m-%d"),
        media_key,
        hash,
        extension_for(content_type)
    )
}

pub fn data_uri(bytes: &[u8], content_type: &str) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
