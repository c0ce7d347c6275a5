use std::{collections::HashMap, sync::Arc, sync::LazyLock};

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::{
    platform::ShareUrl,
    resolver::{MediaReference, ResolutionStrategy, StrategyError},
    service::http::HttpClient,
};

static META_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<meta\b[^>]*>")
        .context("Failed to create meta tag regex")
        .unwrap()
});

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .context("Failed to create attribute regex")
        .unwrap()
});

static IOS_MEDIA_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"media\?id=([0-9_]+)")
        .context("Failed to create media id regex")
        .unwrap()
});

const VIDEO_PROPERTIES: [&str; 3] = ["og:video", "og:video:url", "og:video:secure_url"];
const IMAGE_PROPERTIES: [&str; 2] = ["og:image", "og:image:secure_url"];

/// Reads the Open Graph tags of the public post page.
pub struct PageScrapeStrategy {
    http: Arc<dyn HttpClient>,
}

impl PageScrapeStrategy {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResolutionStrategy for PageScrapeStrategy {
    fn name(&self) -> &str {
        "page_scrape"
    }

    async fn attempt(&self, url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let (status, html) = self.http.get_text(url.as_str(), headers).await?;
        if !status.is_success() {
            return Err(StrategyError::UnexpectedStatus(status));
        }

        let reference = parse_open_graph(&html);
        if !reference.is_resolved() {
            debug!("No Open Graph media on {} ({} bytes of html)", url, html.len());
            return Ok(None);
        }

        Ok(Some(reference))
    }
}

/// Collects `property`/`name` -> `content` for every meta tag, regardless of
/// attribute order. The first occurrence of a key wins.
fn meta_tags(html: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    for tag in META_TAG_REGEX.find_iter(html) {
        let mut key = None;
        let mut content = None;

        for attr in ATTRIBUTE_REGEX.captures_iter(tag.as_str()) {
            let value = attr.get(2).or_else(|| attr.get(3)).map(|m| m.as_str());
            match attr[1].to_ascii_lowercase().as_str() {
                "property" | "name" => key = value.map(str::to_ascii_lowercase),
                "content" => content = value.map(decode_entities),
                _ => {}
            }
        }

        if let (Some(key), Some(content)) = (key, content) {
            if !content.trim().is_empty() {
                tags.entry(key).or_insert(content);
            }
        }
    }

    tags
}

pub(crate) fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#064;", "@")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub(crate) fn parse_open_graph(html: &str) -> MediaReference {
    let tags = meta_tags(html);
    let first_of = |keys: &[&str]| keys.iter().find_map(|key| tags.get(*key).cloned());

    let media_id = tags
        .get("al:ios:url")
        .and_then(|ios| IOS_MEDIA_ID_REGEX.captures(ios))
        .map(|caps| caps[1].to_string());

    MediaReference {
        media_id,
        video_url: first_of(&VIDEO_PROPERTIES),
        thumbnail_url: first_of(&IMAGE_PROPERTIES),
        title: first_of(&["og:title"]),
        ..Default::default()
    }
}
