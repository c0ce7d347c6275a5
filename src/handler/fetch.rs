use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    platform::PlatformError,
    resolver::Resolution,
    state::AppState,
    storage::{data_uri, object_key},
    thumbnail::ImageBytes,
};

use super::FetchResponse;

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    url: Option<String>,
}

pub async fn fetch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResponse>, AppError> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|rejection| {
        warn!("[{}] Rejected request body: {}", request_id, rejection);
        AppError::BadRequest(PlatformError::MissingUrl.to_string())
    })?;
    let url = request.url.unwrap_or_default();
    info!("[{}] Fetch requested for {:?}", request_id, url);

    let resolution = state.resolver.resolve(&url).await.inspect_err(|e| {
        warn!("[{}] Resolution failed: {}", request_id, e);
    })?;

    let image = match state.thumbnailer.capture(&resolution.reference).await {
        Ok(image) => {
            debug!(
                "[{}] Captured {}x{} {} thumbnail",
                request_id, image.width, image.height, image.content_type
            );
            Some(image)
        }
        Err(e) => {
            warn!("[{}] Thumbnail capture failed, responding without one: {}", request_id, e);
            None
        }
    };

    let thumbnail = match &image {
        Some(image) => Some(publish(&state, &resolution, image, request_id).await),
        None => None,
    };

    info!(
        "[{}] Resolved via {} ({} earlier attempts failed)",
        request_id,
        resolution.reference.source_strategy,
        resolution.failures.len()
    );

    Ok(Json(FetchResponse::assemble(&resolution, image.as_ref(), thumbnail)))
}

/// Uploads the still when a store is configured; any storage failure falls
/// back to an inline data URI.
async fn publish(state: &AppState, resolution: &Resolution, image: &ImageBytes, request_id: Uuid) -> String {
    if let Some(store) = &state.blob_store {
        let key = object_key(
            &resolution.share_url.identifier().media_key(),
            &image.data,
            &image.content_type,
            Utc::now(),
        );

        match store.put(image.data.clone(), &key, &image.content_type).await {
            Ok(url) => {
                debug!("[{}] Stored thumbnail at {}", request_id, url);
                return url;
            }
            Err(e) => warn!("[{}] {} upload failed, inlining thumbnail: {}", request_id, store.backend(), e),
        }
    }

    data_uri(&image.data, &image.content_type)
}
