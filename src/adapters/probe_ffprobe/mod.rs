//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` as a subprocess and maps its JSON report onto [`VideoInfo`].

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::model::*;
use crate::error::ProbeError;
use crate::ports::ProbePort;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe_path: String,
    timeout: Duration,
}

impl FFprobeAdapter {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Deadline for a single ffprobe run; the child is killed when it expires
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, ProbeError> {
        if !path.is_file() {
            return Err(ProbeError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("Running {} on {}", self.ffprobe_path, path.display());
        let run = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .kill_on_drop(true)
            .output();
        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| {
                warn!("ffprobe on {} timed out", path.display());
                ProbeError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            })?
            .map_err(|e| ProbeError::ToolMissing {
                tool: self.ffprobe_path.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut info = parse_probe_output(path, &output.stdout)?;
        if info.file_size_bytes() == 0 {
            if let Ok(meta) = tokio::fs::metadata(path).await {
                let container = info.container_format().to_string();
                let bit_rate = info.bit_rate();
                info = info.with_container(container, meta.len(), bit_rate);
            }
        }
        Ok(info)
    }

    async fn tool_available(&self) -> bool {
        let run = Command::new(&self.ffprobe_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        match timeout(self.timeout, run).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!("{} could not be started: {}", self.ffprobe_path, e);
                false
            }
            Err(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
    format_name: Option<String>,
    bit_rate: Option<String>,
}

/// Parse a `num/den` frame rate
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.trim().parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Map an ffprobe JSON report onto video metadata
pub fn parse_probe_output(path: &Path, raw: &[u8]) -> Result<VideoInfo, ProbeError> {
    let report: FfprobeOutput = serde_json::from_slice(raw)?;

    let video = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ProbeError::NoVideoStream {
            path: path.display().to_string(),
        })?;

    let format = report.format.as_ref();
    let duration = format
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video.avg_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(0.0);

    let info = VideoInfo::new(
        path,
        duration,
        video.width.unwrap_or(0),
        video.height.unwrap_or(0),
        fps,
        video.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
    )
    .map_err(|e| ProbeError::InvalidMetadata {
        message: e.to_string(),
    })?;

    let info = info.with_container(
        format
            .and_then(|f| f.format_name.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        format
            .and_then(|f| f.size.as_deref())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        format
            .and_then(|f| f.bit_rate.as_deref())
            .and_then(|b| b.parse().ok()),
    );

    let audio = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(match audio {
        Some(stream) => info.with_audio(AudioTrackInfo {
            codec: stream.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
            channels: stream.channels.unwrap_or(0),
            sample_rate: stream
                .sample_rate
                .as_deref()
                .and_then(|r| r.parse().ok())
                .unwrap_or(0),
        }),
        None => info,
    })
}
