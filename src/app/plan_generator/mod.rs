// Plan generator - Turns probe and sample results into an editing plan

pub mod reply;

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::{ContentHeuristics, FallbackPlanner, StylePolicy};
use crate::ports::{CompletionPort, CompletionRequest};

const ANALYSIS_SYSTEM: &str = "You are an expert video editor who analyzes content and provides editing recommendations. Always respond with valid JSON.";
const PLAN_SYSTEM: &str = "You are an expert video editor who creates detailed editing plans for CapCut. Always respond with valid JSON. All times are in seconds and must lie within the video duration.";

/// Asks the completion backend for a plan and falls back to rules when it cannot
pub struct PlanGenerator {
    completion: Arc<dyn CompletionPort>,
    max_tokens: u32,
    analysis_max_tokens: u32,
}

impl PlanGenerator {
    pub fn new(completion: Arc<dyn CompletionPort>, max_tokens: u32, analysis_max_tokens: u32) -> Self {
        Self {
            completion,
            max_tokens,
            analysis_max_tokens,
        }
    }

    /// Editing recommendations; never fails
    pub async fn analyze_for_editing(
        &self,
        info: &VideoInfo,
        sample: Option<&ContentSample>,
    ) -> EditingSuggestions {
        let request = CompletionRequest {
            system: ANALYSIS_SYSTEM.to_string(),
            prompt: analysis_prompt(info, sample),
            max_tokens: self.analysis_max_tokens,
        };

        let text = match self.completion.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(target: "llm", "Analysis request failed, using defaults: {}", e);
                return ContentHeuristics::default_editing_suggestions(info);
            }
        };

        let fallback_style = StylePolicy::for_duration(info.duration());
        match reply::parse_object(&text) {
            Ok(obj) => {
                let fields = reply::analysis_from_object(&obj);
                EditingSuggestions {
                    content_type: fields.content_type.unwrap_or_else(|| "general".to_string()),
                    recommended_style: fields
                        .recommended_style
                        .filter(|s| !s.is_auto())
                        .unwrap_or(fallback_style),
                    suggestions: fields.suggestions.unwrap_or_else(|| {
                        ContentHeuristics::default_editing_suggestions(info).suggestions
                    }),
                    complexity_score: fields.complexity_score,
                    from_model: true,
                }
            }
            Err(e) => {
                debug!(target: "llm", "Analysis reply is not JSON ({}), reading prose", e);
                EditingSuggestions {
                    content_type: "general".to_string(),
                    recommended_style: reply::infer_style_from_text(&text).unwrap_or(fallback_style),
                    suggestions: reply::bullet_points(&text),
                    complexity_score: None,
                    from_model: true,
                }
            }
        }
    }

    /// Produce a plan for the video; never fails
    pub async fn generate(
        &self,
        info: &VideoInfo,
        sample: Option<&ContentSample>,
        options: &EditOptions,
    ) -> PlanOutcome {
        let duration = info.duration();
        let style = if options.style.is_auto() {
            let suggestions = self.analyze_for_editing(info, sample).await;
            info!("Auto style resolved to {}", suggestions.recommended_style);
            suggestions.recommended_style
        } else {
            options.style
        };
        let target = StylePolicy::resolve_target(style, options.target_duration, duration);

        let request = CompletionRequest {
            system: PLAN_SYSTEM.to_string(),
            prompt: plan_prompt(info, sample, style, target, options),
            max_tokens: self.max_tokens,
        };

        let fallback = |reason: FallbackReason| {
            warn!(target: "llm", "Using rule-based plan: {}", reason);
            PlanOutcome::Fallback {
                plan: FallbackPlanner::plan(duration, style, target, options),
                reason,
            }
        };

        let text = match self.completion.complete(request).await {
            Ok(text) => text,
            Err(e) => return fallback(FallbackReason::CompletionFailed(e.to_string())),
        };

        match reply::parse_object(&text) {
            Ok(obj) => {
                let plan = reply::plan_from_object(&obj, duration, style, target, options);
                debug!(
                    cuts = plan.cuts.len(),
                    texts = plan.text_elements.len(),
                    effects = plan.effects.len(),
                    "Parsed generated plan"
                );
                PlanOutcome::Generated(plan)
            }
            Err(e) => fallback(FallbackReason::Unparseable(e)),
        }
    }
}

fn video_section(info: &VideoInfo, sample: Option<&ContentSample>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "- Duration: {:.2}s", info.duration());
    let _ = writeln!(
        out,
        "- Resolution: {}x{} ({})",
        info.width(),
        info.height(),
        info.aspect_ratio()
    );
    let _ = writeln!(out, "- Frame rate: {:.2} fps", info.fps());
    let _ = writeln!(out, "- Codec: {}", info.codec());
    let _ = writeln!(out, "- Has audio: {}", info.has_audio());
    let _ = writeln!(out, "- File size: {:.1} MB", info.file_size_mb());

    if let Some(sample) = sample {
        let _ = writeln!(
            out,
            "- Brightness: {:?} (average {:.0})",
            sample.brightness_level, sample.avg_brightness
        );
        let _ = writeln!(
            out,
            "- Motion: {:?} (average {:.1})",
            sample.motion_level, sample.avg_motion
        );
        if let Some(color) = sample.dominant_color {
            let _ = writeln!(out, "- Dominant color: {:?}", color);
        }
        if !sample.scene_changes.is_empty() {
            let changes: Vec<String> = sample
                .scene_changes
                .iter()
                .map(|t| format!("{:.1}s", t))
                .collect();
            let _ = writeln!(out, "- Scene changes at: {}", changes.join(", "));
        }
    }
    out
}

fn analysis_prompt(info: &VideoInfo, sample: Option<&ContentSample>) -> String {
    format!(
        "Analyze this video information and provide editing recommendations.\n\n\
         Video details:\n{}\n\
         Provide a content analysis, a recommended editing style (one of social_media, \
         highlight_reel, tutorial, vlog), suggested cuts, text overlay and audio ideas, \
         and an editing complexity estimate from 1 to 10.\n\n\
         Return JSON with these keys: content_type, recommended_style, suggestions, cuts, \
         text_overlays, audio_suggestions, complexity_score",
        video_section(info, sample)
    )
}

fn plan_prompt(
    info: &VideoInfo,
    sample: Option<&ContentSample>,
    style: EditingStyle,
    target: f64,
    options: &EditOptions,
) -> String {
    let scene_changes = sample.map(|s| s.scene_changes.as_slice()).unwrap_or(&[]);
    let candidates: Vec<String> = ContentHeuristics::scene_cuts(
        info.duration(),
        scene_changes,
        ContentHeuristics::recommended_cuts(info.duration()),
    )
    .iter()
    .map(|c| format!("{:.1}-{:.1}s", c.start, c.end))
    .collect();

    format!(
        "Create a detailed video editing plan for CapCut.\n\n\
         Video info:\n{}\
         - Candidate segments: {}\n\n\
         Style: {}\n\
         Target duration: {:.1}s\n\
         Add music: {}\n\
         Auto subtitles: {}\n\
         Quality: {}\n\
         Aspect ratio: {}\n\n\
         Include timeline cuts (start/end), transitions between clips, text overlays with \
         timing (text, start, end, font, color, size), effects (type, name, start, end), \
         audio adjustments (music_volume between 0 and 1) and color grading \
         (brightness, contrast, saturation).\n\n\
         Return JSON with keys: cuts, transitions, text_elements, effects, audio, color_grading",
        video_section(info, sample),
        candidates.join(", "),
        style,
        target,
        options.add_music,
        options.auto_subtitles,
        options.quality,
        options.aspect_ratio,
    )
}
