use std::fmt::{self, Display};

use reqwest::StatusCode;

use crate::utils::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("media exceeds {0} bytes")]
    TooLarge(u64),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("unreadable probe output: {0}")]
    Probe(String),
    #[error("no frame was written")]
    EmptyFrame,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Workspace,
    Download,
    Probe,
    Extract,
    Decode,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace => write!(f, "workspace"),
            Self::Download => write!(f, "download"),
            Self::Probe => write!(f, "probe"),
            Self::Extract => write!(f, "extract"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("No thumbnail or video URL to capture from")]
    NoMediaAvailable,
    #[error("Thumbnail {stage} failed: {cause}")]
    Extraction { stage: Stage, cause: String },
}

impl ThumbnailError {
    pub fn at(stage: Stage, cause: impl ToString) -> Self {
        Self::Extraction {
            stage,
            cause: cause.to_string(),
        }
    }
}
