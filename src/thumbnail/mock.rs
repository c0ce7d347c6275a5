use std::{
    io::Cursor,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbImage};
use reqwest::StatusCode;

use super::{
    DownloadError, FetchedMedia, FrameError, FrameSize, FrameTool, MediaDownloader, ToolAvailability, VideoProbe,
};

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

#[derive(Default)]
pub struct MockDownloader {
    image: Option<Vec<u8>>,
    fail: bool,
    pub fetches: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl MockDownloader {
    pub fn with_image(image: Vec<u8>) -> Self {
        Self {
            image: Some(image),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MediaDownloader for MockDownloader {
    async fn fetch(&self, _url: &str, max_bytes: u64) -> Result<FetchedMedia, DownloadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DownloadError::Status(StatusCode::FORBIDDEN));
        }
        let bytes = self.image.clone().unwrap_or_else(|| jpeg(320, 320));
        if bytes.len() as u64 > max_bytes {
            return Err(DownloadError::TooLarge(max_bytes));
        }
        Ok(FetchedMedia {
            bytes: Bytes::from(bytes),
            content_type: Some("image/jpeg".into()),
        })
    }

    async fn download(&self, _url: &str, dest: &Path, _max_bytes: u64) -> Result<u64, DownloadError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DownloadError::Status(StatusCode::FORBIDDEN));
        }
        let body = b"not really a video";
        tokio::fs::write(dest, body).await?;
        Ok(body.len() as u64)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ExtractMode {
    Always,
    OnlyAtStart,
    Never,
}

/// Frame tool that pretends every video has a fixed native size.
pub struct MockFrameTool {
    probe: VideoProbe,
    mode: ExtractMode,
    scales: Mutex<Vec<Option<FrameSize>>>,
    pub probes: AtomicUsize,
    pub extracts: AtomicUsize,
}

impl MockFrameTool {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            probe: VideoProbe {
                width,
                height,
                duration: Some(8.0),
            },
            mode: ExtractMode::Always,
            scales: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
            extracts: AtomicUsize::new(0),
        }
    }

    pub fn empty_after_start(self) -> Self {
        Self {
            mode: ExtractMode::OnlyAtStart,
            ..self
        }
    }

    pub fn never_extracts(self) -> Self {
        Self {
            mode: ExtractMode::Never,
            ..self
        }
    }

    pub fn last_scale(&self) -> Option<FrameSize> {
        self.scales.lock().unwrap().last().copied().flatten()
    }
}

#[async_trait]
impl FrameTool for MockFrameTool {
    async fn availability(&self) -> ToolAvailability {
        ToolAvailability {
            ffmpeg: true,
            ffprobe: true,
        }
    }

    async fn probe(&self, video: &Path) -> Result<VideoProbe, FrameError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        assert!(video.exists(), "probe before download");
        Ok(self.probe)
    }

    async fn extract_frame(
        &self,
        _video: &Path,
        offset_secs: f64,
        scale: Option<FrameSize>,
        dest: &Path,
    ) -> Result<Vec<u8>, FrameError> {
        self.extracts.fetch_add(1, Ordering::SeqCst);
        self.scales.lock().unwrap().push(scale);

        let produces = match self.mode {
            ExtractMode::Always => true,
            ExtractMode::OnlyAtStart => offset_secs == 0.0,
            ExtractMode::Never => false,
        };
        if !produces {
            return Err(FrameError::EmptyFrame);
        }

        let size = scale.unwrap_or(FrameSize {
            width: self.probe.width,
            height: self.probe.height,
        });
        let data = jpeg(size.width, size.height);
        tokio::fs::write(dest, &data).await?;
        Ok(data)
    }
}
