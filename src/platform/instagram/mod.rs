mod util;

use url::Url;

pub use util::*;

use super::PlatformError;

#[derive(Debug, Clone, PartialEq)]
pub enum InstagramIdentifier {
    Post { shortcode: String },
    Reel { shortcode: String },
    Tv { shortcode: String },
}

impl InstagramIdentifier {
    pub fn shortcode(&self) -> &str {
        match self {
            Self::Post { shortcode } | Self::Reel { shortcode } | Self::Tv { shortcode } => shortcode,
        }
    }
}

pub fn is_instagram_host(host: &str) -> bool {
    matches!(host, "instagram.com" | "www.instagram.com" | "m.instagram.com")
}

/// Reads the post kind and shortcode out of `/reel/<code>`, `/p/<code>` and
/// friends, also when prefixed by a username segment.
pub fn parse_post_path(url: &Url) -> Result<InstagramIdentifier, PlatformError> {
    let segments: Vec<_> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let post = match segments.as_slice() {
        [kind, code, ..] if is_post_kind(kind) => Some((*kind, *code)),
        [_, kind, code, ..] if is_post_kind(kind) => Some((*kind, *code)),
        _ => None,
    };

    let (kind, shortcode) = post.ok_or_else(|| PlatformError::UnsupportedPath(url.path().to_string()))?;

    if !validate_shortcode(shortcode) {
        return Err(PlatformError::UnsupportedPath(url.path().to_string()));
    }

    let shortcode = shortcode.to_string();
    Ok(match kind {
        "p" => InstagramIdentifier::Post { shortcode },
        "tv" => InstagramIdentifier::Tv { shortcode },
        _ => InstagramIdentifier::Reel { shortcode },
    })
}

fn is_post_kind(segment: &str) -> bool {
    matches!(segment, "p" | "reel" | "reels" | "tv")
}
