//! Content sampler adapters
//!
//! With the `libav` feature, frames are decoded through `ffmpeg-next` on a
//! blocking thread and reduced by [`crate::analysis`]. Without it, sampling is
//! reported as unavailable and the pipeline runs without content hints.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::model::{ContentSample, VideoInfo};
use crate::ports::SamplerPort;

/// Sampler used when frame decoding is not compiled in
pub struct DisabledSampler;

#[async_trait]
impl SamplerPort for DisabledSampler {
    async fn sample(&self, path: &Path, _info: &VideoInfo) -> Option<ContentSample> {
        debug!("Content sampling disabled, skipping {}", path.display());
        None
    }
}

#[cfg(feature = "libav")]
pub use libav::LibavSampler;

#[cfg(feature = "libav")]
mod libav {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use ffmpeg_next as ffmpeg;
    use tracing::{debug, warn};

    use crate::analysis::{self, RgbFrame, SampledFrame};
    use crate::domain::model::{ContentSample, VideoInfo};
    use crate::ports::SamplerPort;

    /// Width of the downscaled frames used for statistics
    const SAMPLE_WIDTH: u32 = 160;

    /// Decodes a sparse set of frames through libav
    pub struct LibavSampler;

    #[async_trait]
    impl SamplerPort for LibavSampler {
        async fn sample(&self, path: &Path, info: &VideoInfo) -> Option<ContentSample> {
            let timestamps = analysis::sample_timestamps(info.duration(), info.fps());
            if timestamps.is_empty() {
                return None;
            }

            let owned: PathBuf = path.to_path_buf();
            let result = tokio::task::spawn_blocking(move || decode_frames(&owned, &timestamps)).await;

            match result {
                Ok(Ok(frames)) => {
                    debug!("Decoded {} sample frames", frames.len());
                    analysis::summarize(&frames, info.frame_count())
                }
                Ok(Err(message)) => {
                    warn!("Content sampling failed for {}: {}", path.display(), message);
                    None
                }
                Err(join_error) => {
                    warn!("Content sampling task failed: {}", join_error);
                    None
                }
            }
        }
    }

    fn decode_frames(path: &Path, timestamps: &[f64]) -> Result<Vec<SampledFrame>, String> {
        ffmpeg::init().map_err(|e| format!("FFmpeg initialization failed: {}", e))?;

        let mut ictx =
            ffmpeg::format::input(&path).map_err(|e| format!("Failed to open input file: {}", e))?;

        let stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| "No video stream found in input file".to_string())?;
        let stream_index = stream.index();
        let time_base = f64::from(stream.time_base());

        let mut decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| format!("Failed to create decoder context: {}", e))?
            .decoder()
            .video()
            .map_err(|e| format!("Failed to create video decoder: {}", e))?;

        let out_width = SAMPLE_WIDTH.min(decoder.width()).max(2);
        let out_height = ((out_width as u64 * decoder.height() as u64)
            / decoder.width().max(1) as u64)
            .max(2) as u32;

        let mut scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGB24,
            out_width,
            out_height,
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| format!("Failed to create scaler: {}", e))?;

        let mut frames = Vec::with_capacity(timestamps.len());
        for &timestamp in timestamps {
            let target = (timestamp * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
            if let Err(e) = ictx.seek(target, ..target) {
                debug!("Seek to {:.3}s failed: {}", timestamp, e);
                continue;
            }
            decoder.flush();

            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            let mut found = None;
            'packets: for (packet_stream, packet) in ictx.packets() {
                if packet_stream.index() != stream_index {
                    continue;
                }
                if decoder.send_packet(&packet).is_err() {
                    continue;
                }
                while decoder.receive_frame(&mut decoded).is_ok() {
                    let pts = decoded
                        .timestamp()
                        .map(|p| p as f64 * time_base)
                        .unwrap_or(timestamp);
                    if pts + 1e-3 < timestamp {
                        continue;
                    }
                    let mut rgb = ffmpeg::util::frame::video::Video::empty();
                    scaler
                        .run(&decoded, &mut rgb)
                        .map_err(|e| format!("Failed to convert frame: {}", e))?;
                    found = pack_rgb(&rgb);
                    break 'packets;
                }
            }

            if let Some(frame) = found {
                frames.push(SampledFrame { timestamp, frame });
            }
        }

        if frames.is_empty() {
            return Err("no frames could be decoded".to_string());
        }
        Ok(frames)
    }

    /// Copy a possibly padded RGB24 plane into a packed buffer
    fn pack_rgb(frame: &ffmpeg::util::frame::video::Video) -> Option<RgbFrame> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let stride = frame.stride(0);
        let plane = frame.data(0);
        let row_bytes = width * 3;

        let mut data = Vec::with_capacity(row_bytes * height);
        for row in 0..height {
            let offset = row * stride;
            data.extend_from_slice(plane.get(offset..offset + row_bytes)?);
        }
        RgbFrame::new(width, height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_sampler_returns_none() {
        let info = VideoInfo::new("a.mp4", 10.0, 640, 360, 25.0, "h264").unwrap();
        assert!(DisabledSampler.sample(Path::new("a.mp4"), &info).await.is_none());
    }
}
