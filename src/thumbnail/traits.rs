use std::path::Path;

use async_trait::async_trait;

use super::{DownloadError, FetchedMedia, FrameError, FrameSize, VideoProbe};

#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Fetches a small resource into memory.
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedMedia, DownloadError>;

    /// Streams a resource into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path, max_bytes: u64) -> Result<u64, DownloadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolAvailability {
    pub ffmpeg: bool,
    pub ffprobe: bool,
}

#[async_trait]
pub trait FrameTool: Send + Sync {
    async fn availability(&self) -> ToolAvailability;

    async fn probe(&self, video: &Path) -> Result<VideoProbe, FrameError>;

    /// Writes one JPEG frame taken `offset_secs` into `video` to `dest` and
    /// returns its bytes. `None` keeps the native size.
    async fn extract_frame(
        &self,
        video: &Path,
        offset_secs: f64,
        scale: Option<FrameSize>,
        dest: &Path,
    ) -> Result<Vec<u8>, FrameError>;
}
