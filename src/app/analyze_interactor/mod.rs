// Analyze interactor - Orchestrates the content analysis use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::app::plan_generator::PlanGenerator;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::ContentHeuristics;
use crate::ports::*;
use crate::utils::path::is_supported_video;

/// Analysis of one source video
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub input_file: String,
    pub video_info: VideoInfo,
    pub content: Option<ContentSample>,
    pub observations: Vec<String>,
    pub complexity: Complexity,
    pub recommended_cuts: usize,
    pub cut_suggestions: Vec<Cut>,
    pub editing: EditingSuggestions,
}

/// Interactor for content analysis
pub struct AnalyzeInteractor {
    probe_port: Arc<dyn ProbePort>,
    sampler_port: Arc<dyn SamplerPort>,
    generator: Arc<PlanGenerator>,
}

impl AnalyzeInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        sampler_port: Arc<dyn SamplerPort>,
        generator: Arc<PlanGenerator>,
    ) -> Self {
        Self {
            probe_port,
            sampler_port,
            generator,
        }
    }

    pub async fn execute(&self, input: impl Into<PathBuf>) -> Result<AnalyzeResponse, DomainError> {
        let input = input.into();
        self.analyze(&input).await
    }

    async fn analyze(&self, input: &Path) -> Result<AnalyzeResponse, DomainError> {
        info!("Analyzing video: {}", input.display());

        if !input.is_file() {
            return Err(DomainError::FileNotFound(input.display().to_string()));
        }
        if !is_supported_video(input) {
            return Err(DomainError::InvalidFormat(format!(
                "Unsupported video format: {}",
                input.display()
            )));
        }

        let video_info = self.probe_port.probe(input).await?;
        let content = self.sampler_port.sample(input, &video_info).await;
        let editing = self
            .generator
            .analyze_for_editing(&video_info, content.as_ref())
            .await;

        let duration = video_info.duration();
        let recommended_cuts = ContentHeuristics::recommended_cuts(duration);
        let scene_changes = content
            .as_ref()
            .map(|c| c.scene_changes.as_slice())
            .unwrap_or(&[]);

        let response = AnalyzeResponse {
            input_file: input.display().to_string(),
            observations: ContentHeuristics::suggestions(&video_info),
            complexity: ContentHeuristics::complexity(&video_info, content.as_ref()),
            recommended_cuts,
            cut_suggestions: ContentHeuristics::scene_cuts(duration, scene_changes, recommended_cuts),
            editing,
            content,
            video_info,
        };

        info!(
            "Analysis complete: {} complexity, recommended style {}",
            response.complexity, response.editing.recommended_style
        );
        Ok(response)
    }
}
