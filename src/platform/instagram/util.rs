use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

static INSTAGRAM_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.|m\.)?instagram\.com/[^\s]+")
        .context("Failed to create Instagram URL regex")
        .unwrap()
});

static INSTAGRAM_SHORTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{5,64}$")
        .context("Failed to create Instagram shortcode regex")
        .unwrap()
});

pub fn extract_instagram_url(text: &str) -> Option<String> {
    INSTAGRAM_URL_REGEX.find(text).map(|m| m.as_str().to_string())
}

pub fn validate_shortcode(shortcode: &str) -> bool {
    INSTAGRAM_SHORTCODE_REGEX.is_match(shortcode)
}
