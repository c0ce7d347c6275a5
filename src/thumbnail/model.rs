use bytes::Bytes;

/// A still image ready to be stored or inlined.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBytes {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
    /// Length of the source video, when the image was taken from one.
    pub video_duration: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Upscales narrow sources to `min_width`, keeping the aspect ratio with an
    /// even height. Wider sources keep their native size.
    pub fn target(probe: &VideoProbe, min_width: u32) -> Self {
        if probe.width == 0 || probe.height == 0 || probe.width >= min_width {
            return Self {
                width: probe.width,
                height: probe.height,
            };
        }

        let scaled = probe.height as f64 * min_width as f64 / probe.width as f64;
        let height = ((scaled / 2.0).round() * 2.0).max(2.0) as u32;

        Self {
            width: min_width,
            height,
        }
    }
}
