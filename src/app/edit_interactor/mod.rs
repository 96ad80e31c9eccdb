// Edit interactor - Orchestrates the probe → plan → draft pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::app::plan_executor::PlanExecutor;
use crate::app::plan_generator::PlanGenerator;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::PlanValidator;
use crate::ports::*;
use crate::utils::path::{default_output_name, is_supported_video};

/// Request for editing one video
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub input_path: PathBuf,
    pub output_name: Option<String>,
    pub options: EditOptions,
    /// Overrides the configured CapCut drafts folder
    pub draft_folder: Option<PathBuf>,
}

impl EditRequest {
    pub fn new(input_path: impl Into<PathBuf>, options: EditOptions) -> Self {
        Self {
            input_path: input_path.into(),
            output_name: None,
            options,
            draft_folder: None,
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn with_draft_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.draft_folder = Some(folder.into());
        self
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct EditResponse {
    pub success: bool,
    pub input_file: String,
    pub draft_path: Option<String>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub plan_source: Option<PlanSource>,
    pub video_info: Option<VideoInfo>,
    pub plan: Option<EditingPlan>,
}

impl EditResponse {
    pub fn success(input_file: &Path, draft: &DraftHandle) -> Self {
        Self {
            success: true,
            input_file: input_file.display().to_string(),
            draft_path: Some(draft.to_string()),
            error: None,
            warnings: Vec::new(),
            plan_source: None,
            video_info: None,
            plan: None,
        }
    }

    pub fn failure(input_file: &Path, error: impl Into<String>) -> Self {
        Self {
            success: false,
            input_file: input_file.display().to_string(),
            draft_path: None,
            error: Some(error.into()),
            warnings: Vec::new(),
            plan_source: None,
            video_info: None,
            plan: None,
        }
    }
}

/// Request for editing every video of a directory listing
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub inputs: Vec<PathBuf>,
    pub options: EditOptions,
    pub output_dir: Option<PathBuf>,
    pub parallel: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub results: Vec<EditResponse>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResponse {
    fn from_results(results: Vec<EditResponse>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            failed: results.len() - succeeded,
            succeeded,
            results,
        }
    }
}

/// Interactor for the edit use case
pub struct EditInteractor {
    probe_port: Arc<dyn ProbePort>,
    sampler_port: Arc<dyn SamplerPort>,
    control_port: Arc<dyn DraftControlPort>,
    server_port: Option<Arc<dyn ServerControlPort>>,
    generator: Arc<PlanGenerator>,
    executor: Arc<PlanExecutor>,
    drafts_folder: PathBuf,
}

impl EditInteractor {
    /// Create new edit interactor; `server_port` is used to launch a missing server
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        sampler_port: Arc<dyn SamplerPort>,
        control_port: Arc<dyn DraftControlPort>,
        server_port: Option<Arc<dyn ServerControlPort>>,
        generator: Arc<PlanGenerator>,
        executor: Arc<PlanExecutor>,
        drafts_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            probe_port,
            sampler_port,
            control_port,
            server_port,
            generator,
            executor,
            drafts_folder: drafts_folder.into(),
        }
    }

    /// Make sure the editing-control server answers, starting it when allowed
    pub async fn ensure_server(&self) -> Result<(), DomainError> {
        if self.control_port.is_alive().await {
            return Ok(());
        }

        match &self.server_port {
            Some(server) => {
                info!("CapCut MCP server not running, starting it");
                server.start().await.map_err(DomainError::from)?;
                Ok(())
            }
            None => Err(DomainError::ServerUnavailable(
                "CapCut MCP server is not running; start it or pass --start-server".to_string(),
            )),
        }
    }

    /// Run the full pipeline for one file; failures are reported, not returned
    pub async fn execute(&self, request: EditRequest) -> EditResponse {
        if let Err(e) = self.ensure_server().await {
            error!("{}", e);
            return EditResponse::failure(&request.input_path, e.to_string());
        }
        self.run_pipeline(request).await
    }

    async fn run_pipeline(&self, request: EditRequest) -> EditResponse {
        let input = request.input_path.as_path();
        info!("Processing video: {}", input.display());

        if let Err(e) = validate_input(input) {
            return EditResponse::failure(input, e.to_string());
        }

        let video_info = match self.probe_port.probe(input).await {
            Ok(info) => info,
            Err(e) => {
                let e = DomainError::from(e);
                error!("Probe failed for {}: {}", input.display(), e);
                return EditResponse::failure(input, e.to_string());
            }
        };
        info!(
            "Video: {:.1}s, {}x{}, {:.2} fps",
            video_info.duration(),
            video_info.width(),
            video_info.height(),
            video_info.fps()
        );

        let sample = self.sampler_port.sample(input, &video_info).await;
        let outcome = self
            .generator
            .generate(&video_info, sample.as_ref(), &request.options)
            .await;
        let plan_source = outcome.source();
        let plan = PlanValidator::validate(outcome.into_plan(), &video_info);

        let output_name = request
            .output_name
            .clone()
            .unwrap_or_else(|| default_output_name(input, "edited"));
        let draft_folder = request
            .draft_folder
            .clone()
            .unwrap_or_else(|| self.drafts_folder.clone());

        let report = self
            .executor
            .execute(&video_info, &plan, &output_name, &draft_folder)
            .await;

        let mut response = match (&report.draft, report.success) {
            (Some(draft), true) => EditResponse::success(input, draft),
            _ => EditResponse::failure(
                input,
                report
                    .error
                    .clone()
                    .unwrap_or_else(|| "draft was not saved".to_string()),
            ),
        };
        if let PlanSource::Fallback { reason } = &plan_source {
            response
                .warnings
                .push(format!("Used rule-based editing plan ({})", reason));
        }
        response.warnings.extend(report.warnings);
        response.plan_source = Some(plan_source);
        response.video_info = Some(video_info);
        response.plan = Some(plan);

        if response.success {
            info!(
                "Draft ready for {}: {}",
                input.display(),
                response.draft_path.as_deref().unwrap_or_default()
            );
        }
        response
    }

    /// Edit many files with at most `parallel` runs in flight; results keep input order
    pub async fn process_batch(self: &Arc<Self>, request: BatchRequest) -> BatchResponse {
        if request.inputs.is_empty() {
            warn!("No video files to process");
            return BatchResponse::from_results(Vec::new());
        }

        if let Err(e) = self.ensure_server().await {
            error!("{}", e);
            let results = request
                .inputs
                .iter()
                .map(|input| EditResponse::failure(input, e.to_string()))
                .collect();
            return BatchResponse::from_results(results);
        }

        let parallel = request.parallel.clamp(1, num_cpus::get().max(1));
        info!(
            "Processing {} video(s) with {} parallel job(s)",
            request.inputs.len(),
            parallel
        );

        let semaphore = Arc::new(Semaphore::new(parallel));
        let mut tasks = JoinSet::new();
        for (index, input) in request.inputs.iter().enumerate() {
            let mut edit = EditRequest::new(input.clone(), request.options.clone())
                .with_output_name(default_output_name(input, "batch"));
            if let Some(dir) = &request.output_dir {
                edit = edit.with_draft_folder(dir.clone());
            }

            let interactor = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, interactor.run_pipeline(edit).await)
            });
        }

        let mut slots: Vec<Option<EditResponse>> = vec![None; request.inputs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, response)) => slots[index] = Some(response),
                Err(e) => error!("Batch task failed: {}", e),
            }
        }

        let results = slots
            .into_iter()
            .zip(&request.inputs)
            .map(|(slot, input)| {
                slot.unwrap_or_else(|| EditResponse::failure(input, "processing task aborted"))
            })
            .collect::<Vec<_>>();

        let response = BatchResponse::from_results(results);
        info!(
            "Batch finished: {} succeeded, {} failed",
            response.succeeded, response.failed
        );
        response
    }
}

fn validate_input(input: &Path) -> Result<(), DomainError> {
    if !input.is_file() {
        return Err(DomainError::FileNotFound(input.display().to_string()));
    }
    if !is_supported_video(input) {
        return Err(DomainError::InvalidFormat(format!(
            "Unsupported video format: {}",
            input.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DisabledCompletion, DisabledSampler, PlaceholderSubtitles};
    use crate::error::{ControlError, ProbeError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FixedProbe;

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe(&self, path: &Path) -> Result<VideoInfo, ProbeError> {
            if path.to_string_lossy().contains("broken") {
                return Err(ProbeError::NoVideoStream {
                    path: path.display().to_string(),
                });
            }
            Ok(VideoInfo::new(path, 30.0, 1920, 1080, 30.0, "h264").unwrap())
        }
    }

    struct FakeControl {
        alive: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeControl {
        fn new(alive: bool) -> Arc<Self> {
            Arc::new(Self {
                alive: AtomicBool::new(alive),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DraftControlPort for FakeControl {
        async fn call(&self, endpoint: ControlEndpoint, body: Value) -> Result<Value, ControlError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match endpoint {
                ControlEndpoint::SaveDraft => Ok(json!({
                    "draft_path": format!("/drafts/{}", body["draft_id"].as_str().unwrap_or("")),
                })),
                _ => Ok(json!({"success": true})),
            }
        }

        async fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
    }

    struct StartingServer {
        control: Arc<FakeControl>,
    }

    #[async_trait]
    impl ServerControlPort for StartingServer {
        async fn start(&self) -> Result<(), ControlError> {
            self.control.alive.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) {}

        async fn restart(&self) -> Result<(), ControlError> {
            self.start().await
        }
    }

    fn interactor(
        control: Arc<FakeControl>,
        server: Option<Arc<dyn ServerControlPort>>,
    ) -> Arc<EditInteractor> {
        let generator = Arc::new(PlanGenerator::new(
            Arc::new(DisabledCompletion::new("no key")),
            2000,
            1500,
        ));
        let executor = Arc::new(PlanExecutor::new(
            control.clone(),
            Arc::new(PlaceholderSubtitles),
            "/nonexistent-music",
        ));
        Arc::new(EditInteractor::new(
            Arc::new(FixedProbe),
            Arc::new(DisabledSampler),
            control,
            server,
            generator,
            executor,
            "/drafts",
        ))
    }

    fn video_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    fn social() -> EditOptions {
        EditOptions {
            style: EditingStyle::SocialMedia,
            ..EditOptions::default()
        }
    }

    #[tokio::test]
    async fn test_pipeline_with_fallback_plan() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = video_file(&dir, "clip.mp4");
        let control = FakeControl::new(true);

        let response = interactor(control, None)
            .execute(EditRequest::new(&input, social()))
            .await;

        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.draft_path.as_deref(), Some("/drafts/clip_edited"));
        assert!(matches!(response.plan_source, Some(PlanSource::Fallback { .. })));
        assert!(response.warnings[0].contains("rule-based"));
        let plan = response.plan.unwrap();
        assert_eq!(plan.cuts, vec![Cut::new(4.5, 25.5)]);
    }

    #[tokio::test]
    async fn test_missing_input_fails() {
        let control = FakeControl::new(true);
        let response = interactor(control.clone(), None)
            .execute(EditRequest::new("/no/such/file.mp4", social()))
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("File not found"));
        assert_eq!(control.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_extension_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = video_file(&dir, "notes.txt");
        let response = interactor(FakeControl::new(true), None)
            .execute(EditRequest::new(&input, social()))
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("Unsupported"));
    }

    #[tokio::test]
    async fn test_server_down_without_supervisor() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = video_file(&dir, "clip.mp4");
        let control = FakeControl::new(false);

        let response = interactor(control.clone(), None)
            .execute(EditRequest::new(&input, social()))
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("Server unavailable"));
        assert_eq!(control.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_server_started_by_supervisor() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = video_file(&dir, "clip.mp4");
        let control = FakeControl::new(false);
        let server: Arc<dyn ServerControlPort> = Arc::new(StartingServer {
            control: control.clone(),
        });

        let response = interactor(control, Some(server))
            .execute(EditRequest::new(&input, social()).with_output_name("custom"))
            .await;

        assert!(response.success);
        assert_eq!(response.draft_path.as_deref(), Some("/drafts/custom"));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_keeps_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = vec![
            video_file(&dir, "a.mp4"),
            video_file(&dir, "broken.mp4"),
            video_file(&dir, "c.mov"),
        ];

        let response = interactor(FakeControl::new(true), None)
            .process_batch(BatchRequest {
                inputs: inputs.clone(),
                options: social(),
                output_dir: None,
                parallel: 2,
            })
            .await;

        assert_eq!(response.succeeded, 2);
        assert_eq!(response.failed, 1);
        assert!(response.results[0].success);
        assert!(!response.results[1].success);
        assert_eq!(response.results[2].draft_path.as_deref(), Some("/drafts/c_batch"));
        for (result, input) in response.results.iter().zip(&inputs) {
            assert_eq!(result.input_file, input.display().to_string());
        }
    }

    #[tokio::test]
    async fn test_batch_with_server_down_fails_every_item() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = vec![video_file(&dir, "a.mp4"), video_file(&dir, "b.mp4")];

        let response = interactor(FakeControl::new(false), None)
            .process_batch(BatchRequest {
                inputs,
                options: social(),
                output_dir: None,
                parallel: 1,
            })
            .await;

        assert_eq!(response.failed, 2);
    }
}
