use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::{
    platform::ShareUrl,
    resolver::{MediaReference, ResolutionStrategy, StrategyError},
    utils::process,
};

/// Asks `yt-dlp` for the post's metadata without downloading anything.
pub struct ExtractorStrategy {
    program: String,
    cookies_file: Option<PathBuf>,
    timeout: Duration,
}

impl ExtractorStrategy {
    pub fn new(program: String, cookies_file: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            program,
            cookies_file,
            timeout,
        }
    }

    fn command(&self, url: &ShareUrl) -> Command {
        let mut command = Command::new(&self.program);
        command.args(["--dump-single-json", "--no-playlist", "--no-warnings", "-f", "best"]);
        if let Some(cookies) = &self.cookies_file {
            command.arg("--cookies").arg(cookies);
        }
        command.arg(url.as_str());
        command
    }
}

#[async_trait]
impl ResolutionStrategy for ExtractorStrategy {
    fn name(&self) -> &str {
        "extractor"
    }

    async fn available(&self) -> bool {
        process::binary_available(&self.program, "--version").await
    }

    async fn attempt(&self, url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError> {
        let stdout = process::run(&self.program, &mut self.command(url), self.timeout).await?;

        let info: Value = serde_json::from_slice(&stdout)
            .map_err(|e| StrategyError::ParsingError(format!("yt-dlp output is not JSON: {}", e)))?;

        let reference = parse_extractor_output(&info);
        Ok(reference.is_resolved().then_some(reference))
    }
}

fn text(info: &Value, key: &str) -> Option<String> {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The top-level `url` is the selected format; otherwise fall back to the last
/// listed format carrying video, which yt-dlp orders worst to best.
fn best_video_url(info: &Value) -> Option<String> {
    text(info, "url").or_else(|| {
        info.get("formats")?
            .as_array()?
            .iter()
            .rev()
            .filter(|format| format.get("vcodec").and_then(Value::as_str) != Some("none"))
            .find_map(|format| text(format, "url"))
    })
}

fn parse_extractor_output(info: &Value) -> MediaReference {
    let thumbnail_url = text(info, "thumbnail").or_else(|| {
        info.get("thumbnails")?
            .as_array()?
            .iter()
            .rev()
            .find_map(|thumb| text(thumb, "url"))
    });

    let media_id = text(info, "id").or_else(|| info.get("id").and_then(Value::as_u64).map(|id| id.to_string()));

    MediaReference {
        media_id,
        video_url: best_video_url(info),
        thumbnail_url,
        title: text(info, "title").or_else(|| text(info, "description")),
        duration: info.get("duration").and_then(Value::as_f64),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::utils::ProcessError;

    #[test]
    fn test_parse_selected_format() {
        let reference = parse_extractor_output(&json!({
            "id": "ABC123",
            "title": "Video by someone",
            "url": "https://cdn/best.mp4",
            "thumbnail": "https://cdn/thumb.jpg",
            "duration": 14.2,
            "webpage_url": "https://www.instagram.com/reel/ABC123/"
        }));

        assert_eq!(reference.media_id.as_deref(), Some("ABC123"));
        assert_eq!(reference.video_url.as_deref(), Some("https://cdn/best.mp4"));
        assert_eq!(reference.thumbnail_url.as_deref(), Some("https://cdn/thumb.jpg"));
        assert_eq!(reference.title.as_deref(), Some("Video by someone"));
        assert_eq!(reference.duration, Some(14.2));
    }

    #[test]
    fn test_parse_falls_back_to_formats() {
        let reference = parse_extractor_output(&json!({
            "id": "ABC123",
            "formats": [
                { "url": "https://cdn/low.mp4", "vcodec": "avc1" },
                { "url": "https://cdn/high.mp4", "vcodec": "avc1" },
                { "url": "https://cdn/audio.m4a", "vcodec": "none" }
            ],
            "thumbnails": [
                { "url": "https://cdn/t-small.jpg" },
                { "url": "https://cdn/t-large.jpg" }
            ]
        }));

        assert_eq!(reference.video_url.as_deref(), Some("https://cdn/high.mp4"));
        assert_eq!(reference.thumbnail_url.as_deref(), Some("https://cdn/t-large.jpg"));
    }

    #[test]
    fn test_parse_nothing_usable() {
        assert!(!parse_extractor_output(&json!({ "id": "x", "title": "t" })).is_resolved());
    }

    #[test]
    fn test_command_line() {
        let strategy = ExtractorStrategy::new(
            "yt-dlp".into(),
            Some(PathBuf::from("/tmp/cookies.txt")),
            Duration::from_secs(5),
        );
        let url = ShareUrl::parse("https://www.instagram.com/reel/ABC123/").unwrap();
        let command = strategy.command(&url);
        let args: Vec<_> = command.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            vec![
                "--dump-single-json",
                "--no-playlist",
                "--no-warnings",
                "-f",
                "best",
                "--cookies",
                "/tmp/cookies.txt",
                "https://www.instagram.com/reel/ABC123/"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_attempt() {
        let strategy = ExtractorStrategy::new("no-such-yt-dlp-4711".into(), None, Duration::from_secs(5));
        let url = ShareUrl::parse("https://www.instagram.com/reel/ABC123/").unwrap();

        assert!(!strategy.available().await);
        assert!(matches!(
            strategy.attempt(&url).await,
            Err(StrategyError::Process(ProcessError::Spawn { .. }))
        ));
    }
}
