//! Frame statistics for content sampling
//!
//! Pure functions over decoded RGB frames. Decoding lives in the sampler
//! adapter; everything here is deterministic and testable without libav.

use crate::domain::model::{BrightnessLevel, ContentSample, DominantColor, MotionLevel};

/// Number of frames sampled across a video
pub const SAMPLE_COUNT: u64 = 10;

/// Histogram correlation below which consecutive samples count as a scene change
pub const SCENE_CHANGE_THRESHOLD: f64 = 0.7;

/// Motion scores above this multiple of the average are reported as peaks
pub const MOTION_PEAK_FACTOR: f64 = 1.5;

/// Packed RGB24 frame
#[derive(Debug, Clone)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbFrame {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() < width * height * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data[..self.width * self.height * 3].chunks_exact(3)
    }

    /// Grayscale plane using BT.601 luma weights
    pub fn luma(&self) -> Vec<u8> {
        self.pixels()
            .map(|px| {
                let y = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect()
    }

    /// Mean of each colour channel
    pub fn channel_means(&self) -> [f64; 3] {
        let mut sums = [0u64; 3];
        let mut count = 0u64;
        for px in self.pixels() {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
            count += 1;
        }
        let count = count.max(1) as f64;
        [
            sums[0] as f64 / count,
            sums[1] as f64 / count,
            sums[2] as f64 / count,
        ]
    }
}

/// A decoded frame and its position in the video
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub timestamp: f64,
    pub frame: RgbFrame,
}

/// Timestamps of the frames to sample for a video
pub fn sample_timestamps(duration: f64, fps: f64) -> Vec<f64> {
    if !(duration.is_finite() && fps.is_finite()) || duration <= 0.0 || fps <= 0.0 {
        return Vec::new();
    }
    let frame_count = (duration * fps).floor() as u64;
    let step = (frame_count / SAMPLE_COUNT).max(1);
    (0..frame_count)
        .step_by(step as usize)
        .map(|index| index as f64 / fps)
        .collect()
}

pub fn mean(plane: &[u8]) -> f64 {
    if plane.is_empty() {
        return 0.0;
    }
    plane.iter().map(|&v| v as u64).sum::<u64>() as f64 / plane.len() as f64
}

/// Mean absolute per-pixel difference between two planes
pub fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as u64)
        .sum::<u64>() as f64
        / len as f64
}

pub fn histogram(plane: &[u8]) -> [f64; 256] {
    let mut bins = [0.0; 256];
    for &v in plane {
        bins[v as usize] += 1.0;
    }
    bins
}

/// Pearson correlation of two histograms; identical flat histograms correlate at 1.0
pub fn correlation(h1: &[f64; 256], h2: &[f64; 256]) -> f64 {
    let n = 256.0;
    let m1 = h1.iter().sum::<f64>() / n;
    let m2 = h2.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut d1 = 0.0;
    let mut d2 = 0.0;
    for (a, b) in h1.iter().zip(h2.iter()) {
        let x = a - m1;
        let y = b - m2;
        num += x * y;
        d1 += x * x;
        d2 += y * y;
    }

    let den = d1 * d2;
    if den.abs() > f64::EPSILON {
        num / den.sqrt()
    } else {
        1.0
    }
}

fn dominant_color(frame: &RgbFrame) -> DominantColor {
    let [r, g, b] = frame.channel_means();
    if r >= g && r >= b {
        DominantColor::Red
    } else if g >= b {
        DominantColor::Green
    } else {
        DominantColor::Blue
    }
}

/// Reduce sampled frames into content hints
pub fn summarize(frames: &[SampledFrame], estimated_frames: u64) -> Option<ContentSample> {
    if frames.is_empty() {
        return None;
    }

    let planes: Vec<Vec<u8>> = frames.iter().map(|f| f.frame.luma()).collect();
    let brightness: Vec<f64> = planes.iter().map(|p| mean(p)).collect();

    let avg_brightness = brightness.iter().sum::<f64>() / brightness.len() as f64;
    let max_brightness = brightness.iter().copied().fold(f64::MIN, f64::max);
    let min_brightness = brightness.iter().copied().fold(f64::MAX, f64::min);

    let motion: Vec<f64> = planes
        .windows(2)
        .map(|pair| mean_abs_diff(&pair[0], &pair[1]))
        .collect();
    let avg_motion = if motion.is_empty() {
        0.0
    } else {
        motion.iter().sum::<f64>() / motion.len() as f64
    };
    let motion_peaks = motion
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > avg_motion * MOTION_PEAK_FACTOR)
        .map(|(i, _)| i)
        .collect();

    let histograms: Vec<[f64; 256]> = planes.iter().map(|p| histogram(p)).collect();
    let scene_changes = histograms
        .windows(2)
        .zip(frames.iter().skip(1))
        .filter(|(pair, _)| correlation(&pair[0], &pair[1]) < SCENE_CHANGE_THRESHOLD)
        .map(|(_, frame)| frame.timestamp)
        .collect();

    Some(ContentSample {
        timestamps: frames.iter().map(|f| f.timestamp).collect(),
        avg_brightness,
        brightness_variance: max_brightness - min_brightness,
        brightness_level: BrightnessLevel::classify(avg_brightness),
        avg_motion,
        motion_level: MotionLevel::classify(avg_motion),
        motion_peaks,
        dominant_color: Some(dominant_color(&frames[frames.len() / 2].frame)),
        scene_changes,
        estimated_frames,
    })
}
