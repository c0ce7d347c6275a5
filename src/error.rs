use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    platform::PlatformError,
    resolver::{ResolveError, StrategyFailure},
};

pub const INVALID_URL_MESSAGE: &str = "Provide a valid Instagram reel or post URL.";
pub const EXHAUSTED_MESSAGE: &str = "Could not extract thumbnail or video";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<Vec<StrategyFailure>>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            attempts: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Resolve(ResolveError::InvalidInput(PlatformError::MissingUrl)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::message(PlatformError::MissingUrl.to_string()),
            ),
            AppError::Resolve(ResolveError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::message(INVALID_URL_MESSAGE))
            }
            AppError::Resolve(ResolveError::Exhausted { attempts }) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: EXHAUSTED_MESSAGE.to_string(),
                    attempts: Some(attempts),
                },
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody::message(message)),
            other => {
                error!("Internal error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(other.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}
