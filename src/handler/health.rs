use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn home() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Recolekt API active" }))
}

#[derive(Debug, Serialize)]
pub struct StrategyHealth {
    name: String,
    available: bool,
}

#[derive(Debug, Serialize)]
pub struct StorageHealth {
    backend: &'static str,
    ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    ffmpeg: bool,
    ffprobe: bool,
    strategies: Vec<StrategyHealth>,
    storage: StorageHealth,
    rest_api_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tools = state.thumbnailer.frame_tool().availability().await;

    let mut strategies = Vec::with_capacity(state.resolver.strategies().len());
    for strategy in state.resolver.strategies() {
        strategies.push(StrategyHealth {
            name: strategy.name().to_string(),
            available: strategy.available().await,
        });
    }

    let storage = match &state.blob_store {
        Some(store) => StorageHealth {
            backend: store.backend(),
            ok: store
                .check()
                .await
                .inspect_err(|e| warn!("Storage check failed: {}", e))
                .is_ok(),
        },
        None => StorageHealth {
            backend: "inline",
            ok: true,
        },
    };

    Json(HealthResponse {
        status: "ok",
        ffmpeg: tools.ffmpeg,
        ffprobe: tools.ffprobe,
        strategies,
        storage,
        rest_api_configured: state.config.rest_api.is_some(),
    })
}
