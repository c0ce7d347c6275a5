use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    instagram::{self, InstagramIdentifier},
    PlatformError,
};

#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Instagram,
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instagram => write!(f, "Instagram"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformIdentifier {
    Instagram(InstagramIdentifier),
}

impl PlatformIdentifier {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Instagram(_) => Platform::Instagram,
        }
    }

    /// Stable per-post key, used to name stored thumbnails.
    pub fn media_key(&self) -> String {
        match self {
            Self::Instagram(identifier) => format!("instagram-{}", identifier.shortcode()),
        }
    }
}

/// A validated post link on a supported platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareUrl {
    url: Url,
    identifier: PlatformIdentifier,
}

impl ShareUrl {
    /// Accepts either a bare link or a pasted snippet containing one.
    pub fn parse(input: &str) -> Result<Self, PlatformError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PlatformError::MissingUrl);
        }

        let candidate = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => {
                let found = instagram::extract_instagram_url(input)
                    .ok_or_else(|| PlatformError::InvalidUrl(input.to_string()))?;
                Url::parse(&found).map_err(|_| PlatformError::InvalidUrl(input.to_string()))?
            }
        };

        if !matches!(candidate.scheme(), "http" | "https") {
            return Err(PlatformError::InvalidUrl(input.to_string()));
        }

        let host = candidate.host_str().unwrap_or_default();
        if !instagram::is_instagram_host(host) {
            return Err(PlatformError::UnsupportedHost(host.to_string()));
        }

        let identifier = instagram::parse_post_path(&candidate)?;

        Ok(Self {
            url: candidate,
            identifier: PlatformIdentifier::Instagram(identifier),
        })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn identifier(&self) -> &PlatformIdentifier {
        &self.identifier
    }
}

impl Display for ShareUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
