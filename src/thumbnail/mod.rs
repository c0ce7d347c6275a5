mod error;
mod ffmpeg;
#[cfg(test)]
pub mod mock;
mod model;
mod traits;

use std::{io::Cursor, path::Path, sync::Arc};

use bytes::Bytes;
use image::ImageReader;

pub use error::*;
pub use ffmpeg::FfmpegTool;
pub use model::*;
pub use traits::*;

use crate::{config::ThumbnailConfig, resolver::MediaReference};

const SOURCE_FILE: &str = "source.mp4";
const FRAME_FILE: &str = "frame.jpg";
const JPEG: &str = "image/jpeg";

/// Produces one still image for a resolved reference, either by re-hosting
/// the known thumbnail or by grabbing a frame from the video.
#[derive(Clone)]
pub struct Thumbnailer {
    downloader: Arc<dyn MediaDownloader>,
    frame_tool: Arc<dyn FrameTool>,
    config: ThumbnailConfig,
}

impl Thumbnailer {
    pub fn new(downloader: Arc<dyn MediaDownloader>, frame_tool: Arc<dyn FrameTool>, config: ThumbnailConfig) -> Self {
        Self {
            downloader,
            frame_tool,
            config,
        }
    }

    pub fn frame_tool(&self) -> &Arc<dyn FrameTool> {
        &self.frame_tool
    }

    pub async fn capture(&self, reference: &MediaReference) -> Result<ImageBytes, ThumbnailError> {
        let thumbnail_url = reference.thumbnail_url.as_deref().filter(|u| !u.trim().is_empty());
        let video_url = reference.video_url.as_deref().filter(|u| !u.trim().is_empty());

        match (thumbnail_url, video_url) {
            (Some(url), _) => self.rehost(url).await,
            (None, Some(url)) => self.grab_frame(url).await,
            (None, None) => Err(ThumbnailError::NoMediaAvailable),
        }
    }

    async fn rehost(&self, url: &str) -> Result<ImageBytes, ThumbnailError> {
        debug!("Fetching thumbnail {}", url);

        let fetched = self
            .downloader
            .fetch(url, self.config.max_image_bytes)
            .await
            .map_err(|e| ThumbnailError::at(Stage::Download, e))?;

        let (width, height, guessed) = image_header(&fetched.bytes)?;
        let content_type = fetched
            .content_type
            .filter(|ct| ct.starts_with("image/"))
            .or(guessed)
            .unwrap_or_else(|| JPEG.to_string());

        Ok(ImageBytes {
            data: fetched.bytes,
            width,
            height,
            content_type,
            video_duration: None,
        })
    }

    async fn grab_frame(&self, url: &str) -> Result<ImageBytes, ThumbnailError> {
        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| ThumbnailError::at(Stage::Workspace, e))?;

        // Removed on drop, whichever way this function returns.
        let workspace = tempfile::Builder::new()
            .prefix("frame-")
            .tempdir_in(&self.config.temp_dir)
            .map_err(|e| ThumbnailError::at(Stage::Workspace, e))?;

        let source = workspace.path().join(SOURCE_FILE);
        let written = self
            .downloader
            .download(url, &source, self.config.max_video_bytes)
            .await
            .map_err(|e| ThumbnailError::at(Stage::Download, e))?;
        debug!("Video downloaded ({} bytes)", written);

        let probe = self
            .frame_tool
            .probe(&source)
            .await
            .map_err(|e| ThumbnailError::at(Stage::Probe, e))?;

        let target = FrameSize::target(&probe, self.config.min_width);
        let scale = (target.width != probe.width).then_some(target);
        if scale.is_some() {
            info!(
                "Upscaling frame from {}x{} to {}x{}",
                probe.width, probe.height, target.width, target.height
            );
        }

        let data = self.extract(&source, scale, &workspace.path().join(FRAME_FILE)).await?;
        let (width, height, _) = image_header(&data)?;

        Ok(ImageBytes {
            data: Bytes::from(data),
            width,
            height,
            content_type: JPEG.to_string(),
            video_duration: probe.duration,
        })
    }

    /// Seeks to the configured offset first; clips shorter than the offset
    /// get a second try at the very first frame.
    async fn extract(&self, source: &Path, scale: Option<FrameSize>, dest: &Path) -> Result<Vec<u8>, ThumbnailError> {
        let offset = self.config.frame_offset_secs;

        match self.frame_tool.extract_frame(source, offset, scale, dest).await {
            Ok(data) => Ok(data),
            Err(e) if offset > 0.0 => {
                warn!("Frame at {}s failed ({}), retrying at 0s", offset, e);
                self.frame_tool
                    .extract_frame(source, 0.0, scale, dest)
                    .await
                    .map_err(|e| ThumbnailError::at(Stage::Extract, e))
            }
            Err(e) => Err(ThumbnailError::at(Stage::Extract, e)),
        }
    }
}

/// Reads dimensions from the image header without decoding pixels.
fn image_header(data: &[u8]) -> Result<(u32, u32, Option<String>), ThumbnailError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ThumbnailError::at(Stage::Decode, e))?;

    let mime = reader.format().map(|format| format.to_mime_type().to_string());
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ThumbnailError::at(Stage::Decode, e))?;

    Ok((width, height, mime))
}
