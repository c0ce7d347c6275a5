use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::{
    config::RestApiConfig,
    platform::ShareUrl,
    resolver::{MediaReference, ResolutionStrategy, StrategyError},
    service::http::HttpClient,
};

/// `(path, query parameter)` shapes seen across share-link resolver APIs.
const RESOLVE_VARIANTS: [(&str, &str); 5] = [
    ("/resolve-share-link", "share_url"),
    ("/resolve-share-link", "url"),
    ("/resolveShareLink", "url"),
    ("/resolveShareLink", "share_url"),
    ("/resolve", "link"),
];

const DETAILS_VARIANTS: [(&str, &str); 3] = [
    ("/media-details", "media_id"),
    ("/mediaDetails", "media_id"),
    ("/media", "id"),
];

pub struct RestLookupStrategy {
    http: Arc<dyn HttpClient>,
    config: Option<RestApiConfig>,
}

impl RestLookupStrategy {
    pub fn new(http: Arc<dyn HttpClient>, config: Option<RestApiConfig>) -> Self {
        Self { http, config }
    }

    fn headers(config: &RestApiConfig) -> Result<HeaderMap, StrategyError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|_| StrategyError::NotConfigured("RAPIDAPI_KEY is not a valid header value".into()))?;
        let host = HeaderValue::from_str(&config.host)
            .map_err(|_| StrategyError::NotConfigured("RAPIDAPI_HOST is not a valid header value".into()))?;
        headers.insert("x-rapidapi-key", key);
        headers.insert("x-rapidapi-host", host);
        Ok(headers)
    }

    /// Tries each endpoint shape in turn and returns the first payload that
    /// `accept` turns into a value. Transport errors and non-200 answers just
    /// move on to the next shape.
    async fn first_match<T>(
        &self,
        config: &RestApiConfig,
        variants: &[(&str, &str)],
        value: &str,
        accept: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, StrategyError> {
        let headers = Self::headers(config)?;
        let mut last_error = None;

        for &(path, param) in variants {
            let endpoint = endpoint(&config.base_url, path).map_err(|e| StrategyError::ParsingError(format!("Invalid REST endpoint {}: {}", path, e)))?;

            match self
                .http
                .get_json(endpoint.as_str(), &[(param, value)], headers.clone())
                .await
            {
                Ok((status, body)) if status.is_success() => {
                    if let Some(found) = accept(&body) {
                        debug!("REST lookup matched {}?{}", path, param);
                        return Ok(Some(found));
                    }
                }
                Ok((status, _)) => {
                    debug!("REST lookup {} answered {}", path, status);
                    last_error = Some(StrategyError::UnexpectedStatus(status));
                }
                Err(e) => {
                    debug!("REST lookup {} failed: {}", path, e);
                    last_error = Some(StrategyError::Network(e));
                }
            }
        }

        match last_error {
            // Only surface an error when no shape produced a usable answer at all.
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ResolutionStrategy for RestLookupStrategy {
    fn name(&self) -> &str {
        "rest_lookup"
    }

    async fn available(&self) -> bool {
        self.config.is_some()
    }

    async fn attempt(&self, url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StrategyError::NotConfigured("RAPIDAPI_HOST and RAPIDAPI_KEY are not set".into()))?;

        let resolved = self
            .first_match(config, &RESOLVE_VARIANTS, url.as_str(), |body| {
                media_id_of(body).map(|id| (id, body.clone()))
            })
            .await?;

        let Some((media_id, resolve_body)) = resolved else {
            return Ok(None);
        };
        info!("REST lookup resolved media id {}", media_id);

        let details = self
            .first_match(config, &DETAILS_VARIANTS, &media_id, |body| {
                let reference = media_from_details(body);
                reference.is_resolved().then_some(reference)
            })
            .await
            .unwrap_or_else(|e| {
                warn!("REST media details failed for {}: {}", media_id, e);
                None
            });

        // Some resolvers already embed the media URLs in the share-link answer.
        let reference = details.unwrap_or_else(|| media_from_details(&resolve_body));

        Ok(Some(MediaReference {
            media_id: Some(media_id),
            ..reference
        }))
    }
}

/// Accepts both string and numeric identifiers.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolves `path` below the base path, so a base like `https://host/v1`
/// keeps its `/v1` prefix.
fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
}

fn media_id_of(body: &Value) -> Option<String> {
    ["media_id", "id", "pk"]
        .iter()
        .find_map(|key| body.get(key).and_then(value_to_id))
        .or_else(|| body.pointer("/data/media_id").and_then(value_to_id))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Picks the widest candidate; a missing width counts as 0 and ties keep the
/// earlier candidate.
fn highest_resolution(candidates: &[Value]) -> Option<String> {
    let mut best: Option<(f64, &Value)> = None;

    for candidate in candidates {
        let width = candidate.get("width").and_then(Value::as_f64).unwrap_or(0.0);
        match best {
            Some((best_width, _)) if width <= best_width => {}
            _ => best = Some((width, candidate)),
        }
    }

    best.and_then(|(_, candidate)| non_empty_str(candidate.get("url")))
}

fn media_from_details(body: &Value) -> MediaReference {
    let body = match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => body,
    };

    let thumbnail_url = body
        .pointer("/image_versions2/candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| highest_resolution(candidates))
        .or_else(|| {
            ["thumb", "thumbnail_url", "display_url"]
                .iter()
                .find_map(|key| non_empty_str(body.get(key)))
        });

    let video_url = non_empty_str(body.get("video_url")).or_else(|| non_empty_str(body.pointer("/video_versions/0/url")));

    let title = non_empty_str(body.pointer("/caption/text")).or_else(|| non_empty_str(body.get("title")));

    let duration = body.get("video_duration").and_then(Value::as_f64);

    MediaReference {
        video_url,
        thumbnail_url,
        title,
        duration,
        ..Default::default()
    }
}
