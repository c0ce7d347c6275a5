use serde::Serialize;

use crate::{resolver::Resolution, thumbnail::ImageBytes};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub media_id: Option<String>,
    /// Thumbnail URL as found at the source.
    pub thumb: Option<String>,
    pub video: Option<String>,
    /// Re-hosted URL or inline data URI of the captured still.
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub source_url: String,
    pub source: String,
}

impl FetchResponse {
    pub fn assemble(resolution: &Resolution, image: Option<&ImageBytes>, thumbnail: Option<String>) -> Self {
        let reference = &resolution.reference;

        Self {
            media_id: reference.media_id.clone(),
            thumb: reference.thumbnail_url.clone(),
            video: reference.video_url.clone(),
            thumbnail,
            title: reference.title.clone(),
            duration: reference.duration.or(image.and_then(|i| i.video_duration)),
            source_url: resolution.share_url.as_str().to_string(),
            source: reference.source_strategy.clone(),
        }
    }
}
