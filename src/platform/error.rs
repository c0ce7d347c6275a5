#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlatformError {
    #[error("No URL provided")]
    MissingUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported host: {0}")]
    UnsupportedHost(String),
    #[error("Unsupported link format: {0}")]
    UnsupportedPath(String),
}
