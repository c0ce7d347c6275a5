use reqwest::StatusCode;

use crate::{platform::PlatformError, utils::ProcessError};

use super::StrategyFailure;

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidInput(#[from] PlatformError),
    #[error("Could not extract thumbnail or video")]
    Exhausted { attempts: Vec<StrategyFailure> },
}
