// Domain rules - Business logic and policies

use crate::domain::model::*;

/// Style and target-duration policy
pub struct StylePolicy;

impl StylePolicy {
    /// Style used when nothing better is known
    pub fn for_duration(duration: f64) -> EditingStyle {
        if duration < 60.0 {
            EditingStyle::SocialMedia
        } else {
            EditingStyle::HighlightReel
        }
    }

    /// Default output length for a style
    pub fn default_target(style: EditingStyle, duration: f64) -> f64 {
        match style {
            EditingStyle::SocialMedia => (duration * 0.7).min(60.0),
            EditingStyle::HighlightReel => (duration * 0.5).min(90.0),
            _ => duration * 0.8,
        }
    }

    /// Explicit target if usable, else the style default, never longer than the source
    pub fn resolve_target(style: EditingStyle, requested: Option<f64>, duration: f64) -> f64 {
        requested
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or_else(|| Self::default_target(style, duration))
            .min(duration)
    }
}

/// Deterministic plan used when the completion backend cannot help
pub struct FallbackPlanner;

impl FallbackPlanner {
    pub const SIGNATURE_TEXT: &'static str = "Edited with CapCut CLI";

    pub fn plan(
        duration: f64,
        style: EditingStyle,
        target_duration: f64,
        options: &EditOptions,
    ) -> EditingPlan {
        let mut plan = EditingPlan::empty(style, target_duration, options);
        plan.cuts = Self::cuts(duration, style, target_duration);
        plan.text_elements.push(TextElement {
            text: Self::SIGNATURE_TEXT.to_string(),
            start: 1.0,
            end: 4.0,
            font: "Arial".to_string(),
            color: "#FFFFFF".to_string(),
            size: 30.0,
        });
        plan.effects.push(Effect {
            effect_type: "transition".to_string(),
            name: "fade".to_string(),
            start: 0.0,
            end: 1.0,
        });
        plan
    }

    fn cuts(duration: f64, style: EditingStyle, target: f64) -> Vec<Cut> {
        match style {
            EditingStyle::HighlightReel => vec![
                Cut::new(0.0, duration.min(10.0)),
                Cut::new(duration * 0.3, (duration * 0.3 + 15.0).min(duration)),
                Cut::new(duration * 0.7, (duration * 0.7 + 10.0).min(duration)),
            ],
            EditingStyle::SocialMedia => {
                let start = ((duration - target) / 2.0).max(0.0);
                vec![Cut::new(start, (start + target).min(duration))]
            }
            _ => vec![Cut::new(0.0, target.min(duration))],
        }
    }
}

/// Repairs a plan so every interval lies inside the source duration
pub struct PlanValidator;

impl PlanValidator {
    /// Clamp and repair a plan against the probed video
    pub fn validate(plan: EditingPlan, info: &VideoInfo) -> EditingPlan {
        Self::validate_for_duration(plan, info.duration())
    }

    /// Clamp and repair a plan against a known duration
    pub fn validate_for_duration(mut plan: EditingPlan, duration: f64) -> EditingPlan {
        if plan.style.is_auto() {
            plan.style = StylePolicy::for_duration(duration);
        }

        plan.target_duration = StylePolicy::resolve_target(
            plan.style,
            Some(plan.target_duration),
            duration,
        );

        plan.cuts = Self::retain_valid(plan.cuts, duration);
        plan.effects = Self::retain_valid(plan.effects, duration);
        plan.stickers = Self::retain_valid(plan.stickers, duration);

        let window = duration.min(1.0);
        for text in plan.text_elements.iter_mut() {
            let (mut start, mut end) = clamp_span(text.span(), duration);
            if start >= end {
                end = (start + window).min(duration);
                if start >= end {
                    start = duration - window;
                    end = duration;
                }
                tracing::debug!(text = %text.text, start, end, "Coerced empty text window");
            }
            text.set_span(start, end);
        }

        plan.transitions.retain(|t| t.duration.is_finite());
        for transition in plan.transitions.iter_mut() {
            transition.duration = transition.duration.clamp(0.0, duration);
        }

        plan.audio.music_volume = if plan.audio.music_volume.is_finite() {
            plan.audio.music_volume.clamp(0.0, 1.0)
        } else {
            AudioSettings::default().music_volume
        };

        plan
    }

    fn retain_valid<T: TimedSpan>(items: Vec<T>, duration: f64) -> Vec<T> {
        items
            .into_iter()
            .filter_map(|mut item| {
                let (start, end) = clamp_span(item.span(), duration);
                if start < end {
                    item.set_span(start, end);
                    Some(item)
                } else {
                    tracing::debug!(start, end, "Dropped empty interval");
                    None
                }
            })
            .collect()
    }
}

fn clamp_span((start, end): (f64, f64), duration: f64) -> (f64, f64) {
    let start = if start.is_finite() { start } else { 0.0 };
    let end = if end.is_finite() { end } else { duration };
    (start.clamp(0.0, duration), end.clamp(0.0, duration))
}

/// Output frame size for a quality and aspect ratio
pub struct ResolutionTable;

impl ResolutionTable {
    pub fn dimensions(quality: Quality, aspect_ratio: AspectRatio) -> (u32, u32) {
        let height = quality.base_height();
        let width = match aspect_ratio {
            AspectRatio::Landscape => height * 16 / 9,
            AspectRatio::Portrait => height * 9 / 16,
            AspectRatio::Square => height,
            AspectRatio::Classic => height * 4 / 3,
        };
        (width, height)
    }
}

/// Background track file name for a style
pub fn music_track_for(style: EditingStyle) -> &'static str {
    match style {
        EditingStyle::SocialMedia => "upbeat_short.mp3",
        EditingStyle::HighlightReel => "energetic_sports.mp3",
        EditingStyle::Tutorial => "calm_background.mp3",
        EditingStyle::Vlog => "casual_ambient.mp3",
        EditingStyle::Auto => "default.mp3",
    }
}

/// Rule-based content observations used by analysis and as LLM fallback
pub struct ContentHeuristics;

impl ContentHeuristics {
    const MIN_SEGMENT_SECONDS: f64 = 5.0;

    /// Observations about length, orientation and resolution
    pub fn suggestions(info: &VideoInfo) -> Vec<String> {
        let mut suggestions = Vec::new();

        if info.duration() < 30.0 {
            suggestions.push("Short format - ideal for social media".to_string());
        } else if info.duration() > 300.0 {
            suggestions.push("Long format - consider creating multiple clips".to_string());
        }

        match info.aspect_ratio() {
            AspectRatioLabel::Vertical => {
                suggestions.push("Vertical format - optimize for mobile viewing".to_string())
            }
            AspectRatioLabel::Widescreen => {
                suggestions.push("Horizontal format - good for desktop/TV viewing".to_string())
            }
            _ => {}
        }

        if info.width() < 1280 {
            suggestions.push("Lower resolution - consider upscaling for better quality".to_string());
        }

        suggestions
    }

    pub fn complexity(info: &VideoInfo, sample: Option<&ContentSample>) -> Complexity {
        let mut score = 0;

        if info.duration() > 180.0 {
            score += 2;
        } else if info.duration() > 60.0 {
            score += 1;
        }

        match sample.map(|s| s.motion_level) {
            Some(MotionLevel::High) => score += 2,
            Some(MotionLevel::Moderate) => score += 1,
            _ => {}
        }

        if info.width() >= 1920 {
            score += 1;
        }

        match score {
            0..=2 => Complexity::Simple,
            3..=4 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }

    /// Number of cuts worth suggesting, one per 30 seconds, between 1 and 5
    pub fn recommended_cuts(duration: f64) -> usize {
        ((duration / 30.0) as usize).clamp(1, 5)
    }

    /// Candidate cuts from scene changes, each at least five seconds long
    pub fn scene_cuts(duration: f64, scene_changes: &[f64], target_segments: usize) -> Vec<Cut> {
        let target_segments = target_segments.max(1);

        if scene_changes.is_empty() {
            let segment = duration / target_segments as f64;
            return (0..target_segments)
                .map(|i| {
                    Cut::new(
                        i as f64 * segment,
                        ((i + 1) as f64 * segment).min(duration),
                    )
                })
                .collect();
        }

        let mut changes: Vec<f64> = scene_changes
            .iter()
            .copied()
            .filter(|t| t.is_finite())
            .collect();
        changes.sort_by(|a, b| a.total_cmp(b));

        let mut cuts = Vec::new();
        let mut current_start = 0.0;
        for scene_time in changes {
            if scene_time - current_start > Self::MIN_SEGMENT_SECONDS {
                cuts.push(Cut::new(current_start, scene_time));
                current_start = scene_time;
                if cuts.len() >= target_segments {
                    break;
                }
            }
        }

        if current_start < duration - Self::MIN_SEGMENT_SECONDS {
            cuts.push(Cut::new(current_start, duration));
        }

        cuts.truncate(target_segments);
        cuts
    }

    /// Recommendations used when the completion backend is unavailable
    pub fn default_editing_suggestions(info: &VideoInfo) -> EditingSuggestions {
        let mut suggestions = Vec::new();

        if info.duration() > 120.0 {
            suggestions.push(
                "Video is long - consider creating highlights or multiple shorter clips".to_string(),
            );
        }
        if info.duration() < 15.0 {
            suggestions
                .push("Short video - perfect for social media with minimal editing".to_string());
        }

        match info.aspect_ratio() {
            AspectRatioLabel::Vertical => suggestions
                .push("Vertical format detected - ideal for TikTok/Instagram Stories".to_string()),
            AspectRatioLabel::Widescreen => {
                suggestions.push("Horizontal format - good for YouTube or general use".to_string())
            }
            _ => {}
        }

        EditingSuggestions {
            content_type: "general".to_string(),
            recommended_style: StylePolicy::for_duration(info.duration()),
            suggestions,
            complexity_score: None,
            from_model: false,
        }
    }
}

#[cfg(test)]
mod tests;
