use async_trait::async_trait;
use bytes::Bytes;
use cloud_storage::Client;

use super::{public_url, BlobStore, StorageError};

const GCS_PUBLIC_BASE: &str = "https://storage.googleapis.com";

pub struct GcsStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl GcsStore {
    /// The service account comes from the process environment, validated and
    /// exported before startup (see `StorageConfig::export_credentials`).
    pub fn new(bucket: String, public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url.unwrap_or_else(|| format!("{}/{}", GCS_PUBLIC_BASE, bucket));

        Self {
            client: Client::default(),
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl BlobStore for GcsStore {
    fn backend(&self) -> &'static str {
        "gcs"
    }

    async fn put(&self, bytes: Bytes, key: &str, content_type: &str) -> Result<String, StorageError> {
        let object = self
            .client
            .object()
            .create(&self.bucket, bytes.to_vec(), key, content_type)
            .await?;

        debug!("Uploaded gs://{}/{} ({} bytes)", self.bucket, object.name, object.size);
        Ok(public_url(&self.public_base_url, key))
    }

    async fn check(&self) -> Result<(), StorageError> {
        self.client.bucket().read(&self.bucket).await?;
        Ok(())
    }
}
