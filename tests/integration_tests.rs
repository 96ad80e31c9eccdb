use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use capcut_cli::adapters::{DisabledSampler, FFprobeAdapter, PlaceholderSubtitles};
use capcut_cli::app::{BatchRequest, EditInteractor, EditRequest, PlanExecutor, PlanGenerator};
use capcut_cli::domain::model::*;
use capcut_cli::error::{CompletionError, ControlError, ProbeError};
use capcut_cli::ports::*;

/// Test doubles for the external systems
mod test_utils {
    use super::*;

    pub struct FixedProbe {
        pub duration: f64,
    }

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe(&self, path: &Path) -> Result<VideoInfo, ProbeError> {
            Ok(VideoInfo::new(path, self.duration, 1920, 1080, 25.0, "h264")
                .map_err(|e| ProbeError::InvalidMetadata {
                    message: e.to_string(),
                })?
                .with_container("mov,mp4,m4a,3gp,3g2,mj2", 1_000_000, None))
        }
    }

    pub struct CannedCompletion(pub String);

    #[async_trait]
    impl CompletionPort for CannedCompletion {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    pub struct RecordingServer {
        pub calls: Mutex<Vec<(ControlEndpoint, Value)>>,
    }

    #[async_trait]
    impl DraftControlPort for RecordingServer {
        async fn call(&self, endpoint: ControlEndpoint, body: Value) -> Result<Value, ControlError> {
            self.calls.lock().unwrap().push((endpoint, body.clone()));
            match endpoint {
                ControlEndpoint::SaveDraft => Ok(json!({
                    "success": true,
                    "draft_path": format!("{}/{}", body["draft_folder"].as_str().unwrap_or(""), body["draft_id"].as_str().unwrap_or("")),
                })),
                _ => Ok(json!({"success": true})),
            }
        }

        async fn is_alive(&self) -> bool {
            true
        }
    }

    pub fn interactor(
        duration: f64,
        reply: &str,
        server: Arc<RecordingServer>,
    ) -> Arc<EditInteractor> {
        let generator = Arc::new(PlanGenerator::new(
            Arc::new(CannedCompletion(reply.to_string())),
            2000,
            1500,
        ));
        let executor = Arc::new(PlanExecutor::new(
            server.clone(),
            Arc::new(PlaceholderSubtitles),
            "/no-music",
        ));
        Arc::new(EditInteractor::new(
            Arc::new(FixedProbe { duration }),
            Arc::new(DisabledSampler),
            server,
            None,
            generator,
            executor,
            "/capcut/drafts",
        ))
    }

    pub fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"placeholder").unwrap();
        path
    }

    /// Create a test video file using FFmpeg
    pub fn create_test_video(output_path: &Path, duration: f64) -> bool {
        std::process::Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                "testsrc=duration=10:size=320x240:rate=30",
                "-t",
                &duration.to_string(),
                "-y",
            ])
            .arg(output_path)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

use test_utils::*;

#[tokio::test]
async fn test_generated_plan_is_repaired_before_execution() {
    let reply = r#"```json
{
  "cuts": [{"start": -3, "end": 12}, {"start": 50, "end": 80}, {"start": 20, "end": 20}],
  "text_elements": [{"text": "Late title", "start": 40, "end": 45}],
  "effects": [{"type": "filter", "name": "vintage", "start": 2, "end": 200}],
  "audio": {"music_volume": 4.0}
}
```"#;
    let dir = TempDir::new().unwrap();
    let input = touch(&dir, "beach.mp4");
    let server = Arc::new(RecordingServer::default());

    let options = EditOptions {
        style: EditingStyle::Vlog,
        auto_subtitles: true,
        ..EditOptions::default()
    };
    let response = interactor(30.0, reply, server.clone())
        .execute(EditRequest::new(&input, options))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.draft_path.as_deref(), Some("/capcut/drafts/beach_edited"));
    assert!(matches!(response.plan_source, Some(PlanSource::Generated)));

    let plan = response.plan.unwrap();
    assert_eq!(plan.cuts, vec![Cut::new(0.0, 12.0)]);
    assert_eq!(plan.text_elements[0].start, 29.0);
    assert_eq!(plan.text_elements[0].end, 30.0);
    assert_eq!(plan.effects[0].end, 30.0);
    assert_eq!(plan.audio.music_volume, 1.0);

    let calls = server.calls.lock().unwrap();
    let endpoints: Vec<_> = calls.iter().map(|(e, _)| *e).collect();
    assert_eq!(
        endpoints,
        vec![
            ControlEndpoint::AddVideo,
            ControlEndpoint::AddText,
            ControlEndpoint::AddSubtitle,
            ControlEndpoint::AddEffect,
            ControlEndpoint::SaveDraft,
        ]
    );
    for (_, body) in calls.iter() {
        if let (Some(start), Some(end)) = (body["start"].as_f64(), body["end"].as_f64()) {
            assert!(0.0 <= start && start < end && end <= 30.0, "{}", body);
        }
    }
}

#[tokio::test]
async fn test_unusable_reply_still_produces_a_draft() {
    let dir = TempDir::new().unwrap();
    let input = touch(&dir, "match.mov");
    let server = Arc::new(RecordingServer::default());

    let options = EditOptions {
        style: EditingStyle::HighlightReel,
        ..EditOptions::default()
    };
    let response = interactor(120.0, "I'd cut the boring parts.", server.clone())
        .execute(EditRequest::new(&input, options))
        .await;

    assert!(response.success);
    assert!(matches!(
        response.plan_source,
        Some(PlanSource::Fallback {
            reason: FallbackReason::Unparseable(_)
        })
    ));
    let plan = response.plan.unwrap();
    assert_eq!(
        plan.cuts,
        vec![Cut::new(0.0, 10.0), Cut::new(36.0, 51.0), Cut::new(84.0, 94.0)]
    );

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["style"], "highlight_reel");
    assert_eq!(json["aspect_ratio"], "16:9");
}

#[tokio::test]
async fn test_batch_uses_output_dir_as_drafts_folder() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![touch(&dir, "one.mp4"), touch(&dir, "two.mp4")];
    let server = Arc::new(RecordingServer::default());

    let response = interactor(20.0, "{}", server)
        .process_batch(BatchRequest {
            inputs,
            options: EditOptions::default(),
            output_dir: Some(PathBuf::from("/exports")),
            parallel: 4,
        })
        .await;

    assert_eq!(response.succeeded, 2);
    assert_eq!(
        response.results[0].draft_path.as_deref(),
        Some("/exports/one_batch")
    );
    assert_eq!(
        response.results[1].draft_path.as_deref(),
        Some("/exports/two_batch")
    );
}

#[tokio::test]
#[ignore] // Requires ffmpeg and ffprobe on PATH
async fn test_ffprobe_reads_generated_video() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.mp4");
    if !create_test_video(&path, 3.0) {
        return; // Skip if ffmpeg is not available
    }

    let info = FFprobeAdapter::default().probe(&path).await.unwrap();

    assert_eq!(info.width(), 320);
    assert_eq!(info.height(), 240);
    assert!((info.duration() - 3.0).abs() < 0.2);
    assert!((info.fps() - 30.0).abs() < 0.01);
    assert_eq!(info.aspect_ratio().to_string(), "4:3");
}
