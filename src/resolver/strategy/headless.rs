use std::{sync::LazyLock, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::{
    platform::ShareUrl,
    resolver::{MediaReference, ResolutionStrategy, StrategyError},
    service::http::DEFAULT_USER_AGENT,
    utils::process,
};

use super::page_scrape::{decode_entities, parse_open_graph};

static VIDEO_SRC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<video\b[^>]*?\bsrc=["']([^"']+)["']"#)
        .context("Failed to create video src regex")
        .unwrap()
});

static VIDEO_POSTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<video\b[^>]*?\bposter=["']([^"']+)["']"#)
        .context("Failed to create video poster regex")
        .unwrap()
});

static VIDEO_JSON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:video_url|playable_url|playable_url_quality_hd)"\s*:\s*"([^"]+)""#)
        .context("Failed to create video json regex")
        .unwrap()
});

static IMAGE_JSON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:display_url|thumbnail_src)"\s*:\s*"([^"]+)""#)
        .context("Failed to create image json regex")
        .unwrap()
});

static MP4_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?:(?:\\?/){2}[^"'\s<>]+?\.mp4[^"'\s<>]*"#)
        .context("Failed to create mp4 url regex")
        .unwrap()
});

/// Renders the post in headless Chromium and scans the resulting DOM,
/// including embedded script JSON, for media URLs.
pub struct HeadlessStrategy {
    program: String,
    timeout: Duration,
}

impl HeadlessStrategy {
    pub fn new(program: String, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    fn command(&self, url: &ShareUrl) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args([
                "--headless=new",
                "--disable-gpu",
                "--no-sandbox",
                "--mute-audio",
                "--virtual-time-budget=8000",
                "--dump-dom",
            ])
            .arg(format!("--user-agent={}", DEFAULT_USER_AGENT))
            .arg(url.as_str());
        command
    }
}

#[async_trait]
impl ResolutionStrategy for HeadlessStrategy {
    fn name(&self) -> &str {
        "headless"
    }

    async fn available(&self) -> bool {
        process::binary_available(&self.program, "--version").await
    }

    async fn attempt(&self, url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError> {
        let stdout = process::run(&self.program, &mut self.command(url), self.timeout).await?;
        let dom = String::from_utf8_lossy(&stdout);
        debug!("Rendered {} ({} bytes of DOM)", url, dom.len());

        let reference = scan_dom(&dom);
        Ok(reference.is_resolved().then_some(reference))
    }
}

/// Undoes JSON string escaping and HTML entities as found in script blobs.
fn unescape(raw: &str) -> String {
    decode_entities(&raw.replace("\\/", "/").replace("\\u0026", "&").replace("\\u003d", "="))
}

fn first_http(regex: &Regex, dom: &str) -> Option<String> {
    regex
        .captures_iter(dom)
        .filter_map(|caps| caps.get(1).map(|m| unescape(m.as_str())))
        .find(|url| url.starts_with("http"))
}

fn scan_dom(dom: &str) -> MediaReference {
    let open_graph = parse_open_graph(dom);

    // `<video src>` is often a `blob:` URL under MSE playback; skip those.
    let video_url = first_http(&VIDEO_SRC_REGEX, dom)
        .or_else(|| first_http(&VIDEO_JSON_REGEX, dom))
        .or_else(|| {
            MP4_URL_REGEX
                .find_iter(dom)
                .map(|m| unescape(m.as_str()))
                .next()
        })
        .or(open_graph.video_url);

    let thumbnail_url = first_http(&IMAGE_JSON_REGEX, dom)
        .or_else(|| first_http(&VIDEO_POSTER_REGEX, dom))
        .or(open_graph.thumbnail_url);

    MediaReference {
        media_id: open_graph.media_id,
        video_url,
        thumbnail_url,
        title: open_graph.title,
        ..Default::default()
    }
}
