use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::platform::ShareUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RestLookup,
    PageScrape,
    Extractor,
    Headless,
}

impl StrategyKind {
    /// Cheapest high-resolution source first, slowest last.
    pub const fn default_order() -> [StrategyKind; 4] {
        [Self::RestLookup, Self::PageScrape, Self::Extractor, Self::Headless]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestLookup => "rest_lookup",
            Self::PageScrape => "page_scrape",
            Self::Extractor => "extractor",
            Self::Headless => "headless",
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "rest_lookup" | "rest" => Ok(Self::RestLookup),
            "page_scrape" | "scrape" => Ok(Self::PageScrape),
            "extractor" | "yt_dlp" | "ytdlp" => Ok(Self::Extractor),
            "headless" | "browser" => Ok(Self::Headless),
            _ => Err(format!("unknown strategy: {}", s)),
        }
    }
}

/// Where a share link's media lives, as found by one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    pub media_id: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub source_strategy: String,
}

impl MediaReference {
    pub fn is_resolved(&self) -> bool {
        has_text(&self.video_url) || has_text(&self.thumbnail_url)
    }

    pub fn with_source(self, source_strategy: &str) -> Self {
        Self {
            source_strategy: source_strategy.to_string(),
            ..self
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyFailure {
    pub strategy: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub share_url: ShareUrl,
    pub reference: MediaReference,
    /// Strategies that failed before the winning one.
    pub failures: Vec<StrategyFailure>,
}
