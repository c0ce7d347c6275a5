use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use super::{public_url, BlobStore, StorageError};

/// Keeps blobs in memory; optionally fails every upload.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, bytes: Bytes, key: &str, content_type: &str) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Unavailable("memory store is failing".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(public_url("https://blobs.test", key))
    }

    async fn check(&self) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Unavailable("memory store is failing".into()));
        }
        Ok(())
    }
}
