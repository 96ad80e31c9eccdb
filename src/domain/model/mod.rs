// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Time must be a non-negative number: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = parse_component(minutes, "minutes")?;
                let seconds = parse_seconds(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = parse_component(hours, "hours")?;
                let minutes = parse_component(minutes, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                let seconds = parse_seconds(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(
                "Invalid time format. Supported formats: seconds (e.g., 45), MM:SS (e.g., 1:30), HH:MM:SS (e.g., 1:02:30)".to_string(),
            )),
        }
    }
}

fn parse_component(value: &str, name: &str) -> Result<u32, DomainError> {
    value
        .parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format: {}", name, value)))
}

fn parse_seconds(value: &str) -> Result<f64, DomainError> {
    let seconds = value
        .parse::<f64>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid seconds format: {}", value)))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
    }
    Ok(seconds)
}

/// Aspect ratio label derived from frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioLabel {
    Widescreen,
    Vertical,
    Square,
    Standard,
    Other { width: u32, height: u32 },
}

impl AspectRatioLabel {
    const TOLERANCE: f64 = 0.1;

    /// Classify dimensions, matching common ratios within a 0.1 tolerance
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return AspectRatioLabel::Other { width, height };
        }
        let ratio = width as f64 / height as f64;
        let near = |target: f64| (ratio - target).abs() < Self::TOLERANCE;

        if near(16.0 / 9.0) {
            AspectRatioLabel::Widescreen
        } else if near(9.0 / 16.0) {
            AspectRatioLabel::Vertical
        } else if near(1.0) {
            AspectRatioLabel::Square
        } else if near(4.0 / 3.0) {
            AspectRatioLabel::Standard
        } else {
            AspectRatioLabel::Other { width, height }
        }
    }
}

impl fmt::Display for AspectRatioLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatioLabel::Widescreen => write!(f, "16:9"),
            AspectRatioLabel::Vertical => write!(f, "9:16"),
            AspectRatioLabel::Square => write!(f, "1:1"),
            AspectRatioLabel::Standard => write!(f, "4:3"),
            AspectRatioLabel::Other { width, height } => write!(f, "{}:{}", width, height),
        }
    }
}

impl Serialize for AspectRatioLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Audio track information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioTrackInfo {
    pub codec: String,
    pub channels: u32,
    pub sample_rate: u32,
}

/// Metadata of a source video, validated on construction and read through accessors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    path: PathBuf,
    duration: f64,
    width: u32,
    height: u32,
    fps: f64,
    codec: String,
    file_size_bytes: u64,
    container_format: String,
    bit_rate: Option<u64>,
    audio: Option<AudioTrackInfo>,
    aspect_ratio: AspectRatioLabel,
}

impl VideoInfo {
    /// Create video info, rejecting non-positive duration, dimensions or frame rate
    pub fn new(
        path: impl Into<PathBuf>,
        duration: f64,
        width: u32,
        height: u32,
        fps: f64,
        codec: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidFormat(format!(
                "Duration must be positive, got {}",
                duration
            )));
        }
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidFormat(format!(
                "Invalid dimensions {}x{}",
                width, height
            )));
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(DomainError::InvalidFormat(format!(
                "Frame rate must be positive, got {}",
                fps
            )));
        }

        Ok(Self {
            path: path.into(),
            duration,
            width,
            height,
            fps,
            codec: codec.into(),
            file_size_bytes: 0,
            container_format: String::new(),
            bit_rate: None,
            audio: None,
            aspect_ratio: AspectRatioLabel::from_dimensions(width, height),
        })
    }

    pub fn with_audio(mut self, audio: AudioTrackInfo) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_container(
        mut self,
        container_format: impl Into<String>,
        file_size_bytes: u64,
        bit_rate: Option<u64>,
    ) -> Self {
        self.container_format = container_format.into();
        self.file_size_bytes = file_size_bytes;
        self.bit_rate = bit_rate;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn audio(&self) -> Option<&AudioTrackInfo> {
        self.audio.as_ref()
    }

    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    pub fn container_format(&self) -> &str {
        &self.container_format
    }

    pub fn bit_rate(&self) -> Option<u64> {
        self.bit_rate
    }

    pub fn aspect_ratio(&self) -> AspectRatioLabel {
        self.aspect_ratio
    }

    /// Estimated number of frames in the stream
    pub fn frame_count(&self) -> u64 {
        (self.duration * self.fps).floor() as u64
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrightnessLevel {
    Dark,
    Normal,
    Bright,
}

impl BrightnessLevel {
    pub fn classify(average: f64) -> Self {
        if average < 80.0 {
            BrightnessLevel::Dark
        } else if average < 180.0 {
            BrightnessLevel::Normal
        } else {
            BrightnessLevel::Bright
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionLevel {
    Static,
    Moderate,
    High,
}

impl MotionLevel {
    pub fn classify(average: f64) -> Self {
        if average < 10.0 {
            MotionLevel::Static
        } else if average < 30.0 {
            MotionLevel::Moderate
        } else {
            MotionLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantColor {
    Red,
    Green,
    Blue,
}

/// Content hints computed from a sparse set of decoded frames
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSample {
    pub timestamps: Vec<f64>,
    pub avg_brightness: f64,
    /// Spread between the darkest and brightest sampled frame
    pub brightness_variance: f64,
    pub brightness_level: BrightnessLevel,
    pub avg_motion: f64,
    pub motion_level: MotionLevel,
    /// Indices of frame pairs whose motion exceeds 1.5x the average
    pub motion_peaks: Vec<usize>,
    pub dominant_color: Option<DominantColor>,
    pub scene_changes: Vec<f64>,
    pub estimated_frames: u64,
}

/// Editing style requested by the user or recommended by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditingStyle {
    Auto,
    SocialMedia,
    HighlightReel,
    Tutorial,
    Vlog,
}

impl EditingStyle {
    pub const CHOICES: [&'static str; 5] = ["auto", "social_media", "highlight_reel", "tutorial", "vlog"];

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(EditingStyle::Auto),
            "social_media" | "social" => Ok(EditingStyle::SocialMedia),
            "highlight_reel" | "highlight" | "highlights" => Ok(EditingStyle::HighlightReel),
            "tutorial" => Ok(EditingStyle::Tutorial),
            "vlog" => Ok(EditingStyle::Vlog),
            other => Err(DomainError::BadArgs(format!(
                "Unknown editing style '{}'. Expected one of: {}",
                other,
                Self::CHOICES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditingStyle::Auto => "auto",
            EditingStyle::SocialMedia => "social_media",
            EditingStyle::HighlightReel => "highlight_reel",
            EditingStyle::Tutorial => "tutorial",
            EditingStyle::Vlog => "vlog",
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, EditingStyle::Auto)
    }
}

impl fmt::Display for EditingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Quality {
    pub const CHOICES: [&'static str; 3] = ["720p", "1080p", "4k"];

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "720p" | "720" => Ok(Quality::Hd720),
            "1080p" | "1080" => Ok(Quality::Hd1080),
            "4k" | "2160p" | "2160" => Ok(Quality::Uhd4k),
            other => Err(DomainError::BadArgs(format!(
                "Unknown quality '{}'. Expected one of: {}",
                other,
                Self::CHOICES.join(", ")
            ))),
        }
    }

    /// Frame height in pixels
    pub fn base_height(&self) -> u32 {
        match self {
            Quality::Hd720 => 720,
            Quality::Hd1080 => 1080,
            Quality::Uhd4k => 2160,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Hd720 => write!(f, "720p"),
            Quality::Hd1080 => write!(f, "1080p"),
            Quality::Uhd4k => write!(f, "4k"),
        }
    }
}

/// Requested output aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Classic,
}

impl AspectRatio {
    pub const CHOICES: [&'static str; 4] = ["16:9", "9:16", "1:1", "4:3"];

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::Classic),
            other => Err(DomainError::BadArgs(format!(
                "Unknown aspect ratio '{}'. Expected one of: {}",
                other,
                Self::CHOICES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Landscape => write!(f, "16:9"),
            AspectRatio::Portrait => write!(f, "9:16"),
            AspectRatio::Square => write!(f, "1:1"),
            AspectRatio::Classic => write!(f, "4:3"),
        }
    }
}

/// Anything placed on the timeline between a start and an end second
pub trait TimedSpan {
    fn span(&self) -> (f64, f64);
    fn set_span(&mut self, start: f64, end: f64);
}

macro_rules! impl_timed_span {
    ($($ty:ty),*) => {
        $(impl TimedSpan for $ty {
            fn span(&self) -> (f64, f64) {
                (self.start, self.end)
            }

            fn set_span(&mut self, start: f64, end: f64) {
                self.start = start;
                self.end = end;
            }
        })*
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub start: f64,
    pub end: f64,
}

impl Cut {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub font: String,
    pub color: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub effect_type: String,
    pub name: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    #[serde(rename = "type")]
    pub sticker_type: String,
    pub content: String,
    pub start: f64,
    pub end: f64,
    pub x: f64,
    pub y: f64,
}

impl_timed_span!(Cut, TextElement, Effect, Sticker);

/// Transition between cuts; carried in the plan but not sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub add_music: bool,
    pub music_volume: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            add_music: false,
            music_volume: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorGrading {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
}

/// User-facing options for one editing run
#[derive(Debug, Clone, PartialEq)]
pub struct EditOptions {
    pub style: EditingStyle,
    pub target_duration: Option<f64>,
    pub quality: Quality,
    pub aspect_ratio: AspectRatio,
    pub add_music: bool,
    pub auto_subtitles: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            style: EditingStyle::Auto,
            target_duration: None,
            quality: Quality::Hd1080,
            aspect_ratio: AspectRatio::Landscape,
            add_music: false,
            auto_subtitles: false,
        }
    }
}

/// Structured editing plan replayed against the editing-control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditingPlan {
    pub style: EditingStyle,
    pub target_duration: f64,
    pub quality: Quality,
    pub aspect_ratio: AspectRatio,
    pub auto_subtitles: bool,
    pub cuts: Vec<Cut>,
    pub transitions: Vec<Transition>,
    pub text_elements: Vec<TextElement>,
    pub effects: Vec<Effect>,
    pub stickers: Vec<Sticker>,
    pub audio: AudioSettings,
    pub color_grading: ColorGrading,
}

impl EditingPlan {
    /// Empty plan carrying only the run parameters
    pub fn empty(style: EditingStyle, target_duration: f64, options: &EditOptions) -> Self {
        Self {
            style,
            target_duration,
            quality: options.quality,
            aspect_ratio: options.aspect_ratio,
            auto_subtitles: options.auto_subtitles,
            cuts: Vec::new(),
            transitions: Vec::new(),
            text_elements: Vec::new(),
            effects: Vec::new(),
            stickers: Vec::new(),
            audio: AudioSettings {
                add_music: options.add_music,
                ..AudioSettings::default()
            },
            color_grading: ColorGrading::default(),
        }
    }
}

/// Why generation fell back to the rule-based plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FallbackReason {
    CompletionFailed(String),
    Unparseable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::CompletionFailed(msg) => write!(f, "completion failed: {}", msg),
            FallbackReason::Unparseable(msg) => write!(f, "unparseable reply: {}", msg),
        }
    }
}

/// Result of plan generation
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Generated(EditingPlan),
    Fallback {
        plan: EditingPlan,
        reason: FallbackReason,
    },
}

impl PlanOutcome {
    pub fn plan(&self) -> &EditingPlan {
        match self {
            PlanOutcome::Generated(plan) | PlanOutcome::Fallback { plan, .. } => plan,
        }
    }

    pub fn into_plan(self) -> EditingPlan {
        match self {
            PlanOutcome::Generated(plan) | PlanOutcome::Fallback { plan, .. } => plan,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanOutcome::Fallback { .. })
    }

    pub fn source(&self) -> PlanSource {
        match self {
            PlanOutcome::Generated(_) => PlanSource::Generated,
            PlanOutcome::Fallback { reason, .. } => PlanSource::Fallback {
                reason: reason.clone(),
            },
        }
    }
}

/// Serializable summary of where a plan came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PlanSource {
    Generated,
    Fallback { reason: FallbackReason },
}

/// Subtitle line placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtitle {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Opaque path of a saved draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftHandle(String);

impl DraftHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One remote call that failed without aborting the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedCall {
    pub endpoint: String,
    pub index: Option<usize>,
    pub message: String,
}

/// Outcome of replaying a plan against the editing-control server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub success: bool,
    pub draft: Option<DraftHandle>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub failed_calls: Vec<FailedCall>,
    pub calls_issued: usize,
    pub draft_path_synthesized: bool,
}

impl ExecutionReport {
    pub fn success(draft: DraftHandle) -> Self {
        Self {
            success: true,
            draft: Some(draft),
            error: None,
            warnings: Vec::new(),
            failed_calls: Vec::new(),
            calls_issued: 0,
            draft_path_synthesized: false,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            draft: None,
            error: Some(error.into()),
            warnings: Vec::new(),
            failed_calls: Vec::new(),
            calls_issued: 0,
            draft_path_synthesized: false,
        }
    }
}

/// Estimated editing effort for a source video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Moderate => write!(f, "moderate"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

/// Editing recommendations, from the LLM or from the rule-based defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditingSuggestions {
    pub content_type: String,
    pub recommended_style: EditingStyle,
    pub suggestions: Vec<String>,
    pub complexity_score: Option<f64>,
    pub from_model: bool,
}

#[cfg(test)]
mod tests;
