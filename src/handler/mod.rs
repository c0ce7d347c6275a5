mod fetch;
mod health;
mod response;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub use response::FetchResponse;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::home))
        .route("/api/health", get(health::health))
        .route("/api/fetch", post(fetch::fetch))
        .route("/api/extract-thumbnail", post(fetch::fetch))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
