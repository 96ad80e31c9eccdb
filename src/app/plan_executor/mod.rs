// Plan executor - Replays a validated plan against the editing-control server

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::{music_track_for, ResolutionTable};
use crate::ports::{ControlEndpoint, DraftControlPort, SubtitlePort};

/// Issues the ordered control calls for one plan
pub struct PlanExecutor {
    control: Arc<dyn DraftControlPort>,
    subtitles: Arc<dyn SubtitlePort>,
    music_dir: PathBuf,
}

/// Mutable state of one execution run
struct Run<'a> {
    control: &'a dyn DraftControlPort,
    calls_issued: usize,
    failed_calls: Vec<FailedCall>,
}

impl Run<'_> {
    async fn call(&mut self, endpoint: ControlEndpoint, body: Value) -> Result<Value, String> {
        self.calls_issued += 1;
        self.control
            .call(endpoint, body)
            .await
            .map_err(|e| e.to_string())
    }

    /// Call that may fail without stopping the run
    async fn degrade(&mut self, endpoint: ControlEndpoint, index: Option<usize>, body: Value) {
        if let Err(message) = self.call(endpoint, body).await {
            match index {
                Some(i) => warn!("{} #{} failed: {}", endpoint, i, message),
                None => warn!("{} failed: {}", endpoint, message),
            }
            self.failed_calls.push(FailedCall {
                endpoint: endpoint.path().to_string(),
                index,
                message,
            });
        }
    }
}

impl PlanExecutor {
    pub fn new(
        control: Arc<dyn DraftControlPort>,
        subtitles: Arc<dyn SubtitlePort>,
        music_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            control,
            subtitles,
            music_dir: music_dir.into(),
        }
    }

    /// Replay `plan` for the probed video and save it as draft `output_name`
    pub async fn execute(
        &self,
        info: &VideoInfo,
        plan: &EditingPlan,
        output_name: &str,
        draft_folder: &Path,
    ) -> ExecutionReport {
        let mut run = Run {
            control: self.control.as_ref(),
            calls_issued: 0,
            failed_calls: Vec::new(),
        };
        let video_url = info.path().display().to_string();

        // Video segments; any failure aborts the run
        let (width, height) = ResolutionTable::dimensions(plan.quality, plan.aspect_ratio);
        let segments = if plan.cuts.is_empty() {
            vec![Cut::new(0.0, info.duration())]
        } else {
            plan.cuts.clone()
        };
        for (i, cut) in segments.iter().enumerate() {
            let body = json!({
                "video_url": video_url,
                "start": cut.start,
                "end": cut.end,
                "width": width,
                "height": height,
            });
            if let Err(message) = run.call(ControlEndpoint::AddVideo, body).await {
                warn!("Adding video segment {} failed: {}", i, message);
                let mut report = ExecutionReport::failure(format!(
                    "Failed to add video segment {}: {}",
                    i, message
                ));
                report.calls_issued = run.calls_issued;
                report.failed_calls.push(FailedCall {
                    endpoint: ControlEndpoint::AddVideo.path().to_string(),
                    index: Some(i),
                    message,
                });
                return report;
            }
        }
        info!("Added {} video segment(s) at {}x{}", segments.len(), width, height);

        for (i, text) in plan.text_elements.iter().enumerate() {
            let body = json!({
                "text": text.text,
                "start": text.start,
                "end": text.end,
                "font": text.font,
                "font_color": text.color,
                "font_size": text.size,
            });
            run.degrade(ControlEndpoint::AddText, Some(i), body).await;
        }

        if plan.audio.add_music {
            let track = self.music_dir.join(music_track_for(plan.style));
            if track.is_file() {
                let body = json!({
                    "audio_url": track.display().to_string(),
                    "start": 0.0,
                    "end": plan.target_duration,
                    "volume": plan.audio.music_volume,
                });
                run.degrade(ControlEndpoint::AddAudio, None, body).await;
            } else {
                debug!("No music track at {}, skipping audio", track.display());
            }
        }

        if plan.auto_subtitles {
            let subtitles = self
                .subtitles
                .subtitles(info.path(), plan.target_duration)
                .await;
            for (i, subtitle) in subtitles.iter().enumerate() {
                let body = json!({
                    "text": subtitle.text,
                    "start": subtitle.start,
                    "end": subtitle.end,
                });
                run.degrade(ControlEndpoint::AddSubtitle, Some(i), body).await;
            }
        }

        for (i, effect) in plan.effects.iter().enumerate() {
            let body = json!({
                "effect_type": effect.effect_type,
                "effect_name": effect.name,
                "start": effect.start,
                "end": effect.end,
            });
            run.degrade(ControlEndpoint::AddEffect, Some(i), body).await;
        }

        for (i, sticker) in plan.stickers.iter().enumerate() {
            let body = json!({
                "sticker_type": sticker.sticker_type,
                "sticker_content": sticker.content,
                "start": sticker.start,
                "end": sticker.end,
                "x": sticker.x,
                "y": sticker.y,
            });
            run.degrade(ControlEndpoint::AddSticker, Some(i), body).await;
        }

        let body = json!({
            "draft_id": output_name,
            "draft_folder": draft_folder.display().to_string(),
        });
        let saved = run.call(ControlEndpoint::SaveDraft, body).await;
        let returned_path = match &saved {
            Ok(reply) => reply
                .get("draft_path")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            Err(_) => None,
        };

        let (draft, synthesized) = match returned_path {
            Some(path) => (DraftHandle::new(path), false),
            None => (DraftHandle::new(format!("./dfd_{}", output_name)), true),
        };

        let mut report = ExecutionReport::success(draft);
        report.calls_issued = run.calls_issued;
        report.failed_calls = run.failed_calls;
        if synthesized {
            let reason = match saved {
                Err(message) => {
                    report.failed_calls.push(FailedCall {
                        endpoint: ControlEndpoint::SaveDraft.path().to_string(),
                        index: None,
                        message: message.clone(),
                    });
                    format!("save_draft failed ({})", message)
                }
                Ok(_) => "save_draft reply had no draft_path".to_string(),
            };
            let warning = format!(
                "{}; assuming draft at {}",
                reason,
                report.draft.as_ref().map(DraftHandle::as_str).unwrap_or_default()
            );
            warn!("{}", warning);
            report.warnings.push(warning);
            report.draft_path_synthesized = true;
        }
        if !report.failed_calls.is_empty() {
            report.warnings.push(format!(
                "{} control call(s) failed; the draft may be incomplete",
                report.failed_calls.len()
            ));
        }

        info!(
            calls = report.calls_issued,
            failed = report.failed_calls.len(),
            "Draft saved: {}",
            report.draft.as_ref().map(DraftHandle::as_str).unwrap_or_default()
        );
        report
    }
}
