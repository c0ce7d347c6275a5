use std::{path::Path, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::{config::ToolConfig, utils::process};

use super::{FrameError, FrameSize, FrameTool, ToolAvailability, VideoProbe};

const JPEG_QUALITY: &str = "2";

pub struct FfmpegTool {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FfmpegTool {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
            timeout: config.timeout,
        }
    }

    fn frame_command(&self, video: &Path, offset_secs: f64, scale: Option<FrameSize>, dest: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg);
        command.args(["-hide_banner", "-loglevel", "error", "-nostdin"]);
        if offset_secs > 0.0 {
            command.arg("-ss").arg(format!("{:.3}", offset_secs));
        }
        command.arg("-i").arg(video).args(["-an", "-sn", "-frames:v", "1"]);
        if let Some(size) = scale {
            command
                .arg("-vf")
                .arg(format!("scale={}:{}:flags=lanczos", size.width, size.height));
        }
        command.args(["-q:v", JPEG_QUALITY, "-y"]).arg(dest);
        command
    }
}

fn parse_probe(stdout: &[u8]) -> Result<VideoProbe, FrameError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| FrameError::Probe(e.to_string()))?;

    let stream = output
        .streams
        .into_iter()
        .find(|s| s.width.is_some() && s.height.is_some())
        .ok_or_else(|| FrameError::Probe("no video stream".into()))?;

    let duration = output
        .format
        .and_then(|f| f.duration)
        .or(stream.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    Ok(VideoProbe {
        width: stream.width.unwrap_or_default(),
        height: stream.height.unwrap_or_default(),
        duration,
    })
}

#[async_trait]
impl FrameTool for FfmpegTool {
    async fn availability(&self) -> ToolAvailability {
        let (ffmpeg, ffprobe) = tokio::join!(
            process::binary_available(&self.ffmpeg, "-version"),
            process::binary_available(&self.ffprobe, "-version"),
        );
        ToolAvailability { ffmpeg, ffprobe }
    }

    async fn probe(&self, video: &Path) -> Result<VideoProbe, FrameError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height,duration:format=duration"])
            .args(["-of", "json"])
            .arg(video);

        let stdout = process::run(&self.ffprobe, &mut command, self.timeout).await?;
        parse_probe(&stdout)
    }

    async fn extract_frame(
        &self,
        video: &Path,
        offset_secs: f64,
        scale: Option<FrameSize>,
        dest: &Path,
    ) -> Result<Vec<u8>, FrameError> {
        let mut command = self.frame_command(video, offset_secs, scale, dest);
        process::run(&self.ffmpeg, &mut command, self.timeout).await?;

        // Seeking past the end exits cleanly without writing a frame.
        match tokio::fs::read(dest).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(FrameError::EmptyFrame),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FrameError::EmptyFrame),
            Err(e) => Err(FrameError::Io(e)),
        }
    }
}
