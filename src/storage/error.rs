#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Cloud storage error: {0}")]
    Gcs(#[from] cloud_storage::Error),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
