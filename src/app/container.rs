use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::adapters::{
    AnthropicCompletion, DisabledCompletion, FFprobeAdapter, HttpDraftControl,
    McpServerSupervisor, PlaceholderSubtitles,
};
use crate::app::{
    analyze_interactor::AnalyzeInteractor, edit_interactor::EditInteractor,
    plan_executor::PlanExecutor, plan_generator::PlanGenerator,
    server_interactor::ServerInteractor,
};
use crate::config_initialization::AppConfig;
use crate::ports::{CompletionPort, DraftControlPort, ProbePort, SamplerPort, ServerControlPort};

pub trait AppContainer: Send + Sync {
    fn edit_interactor(&self) -> Arc<EditInteractor>;
    fn analyze_interactor(&self) -> Arc<AnalyzeInteractor>;
    fn server_interactor(&self) -> Arc<ServerInteractor>;
    /// Supervisor of the local server, present when auto-start is enabled
    fn server_supervisor(&self) -> Option<Arc<dyn ServerControlPort>>;
}

pub struct DefaultAppContainer {
    edit_interactor: Arc<EditInteractor>,
    analyze_interactor: Arc<AnalyzeInteractor>,
    server_interactor: Arc<ServerInteractor>,
    server_supervisor: Option<Arc<dyn ServerControlPort>>,
}

#[cfg(feature = "libav")]
fn sampler() -> Arc<dyn SamplerPort> {
    Arc::new(crate::adapters::LibavSampler)
}

#[cfg(not(feature = "libav"))]
fn sampler() -> Arc<dyn SamplerPort> {
    debug!("Built without libav, content sampling disabled");
    Arc::new(crate::adapters::DisabledSampler)
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let probe_port: Arc<dyn ProbePort> = Arc::new(
            FFprobeAdapter::new(config.tools.ffprobe_path.clone())
                .with_timeout(Duration::from_secs(config.tools.timeout_secs)),
        );
        let sampler_port = sampler();

        let api_key_configured = config
            .anthropic
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        let completion_port: Arc<dyn CompletionPort> = match &config.anthropic.api_key {
            Some(key) if !key.trim().is_empty() => {
                info!("Using Anthropic model {}", config.anthropic.model);
                Arc::new(AnthropicCompletion::new(&config.anthropic, key.clone()))
            }
            _ => {
                info!("ANTHROPIC_API_KEY not set, rule-based plans will be used");
                Arc::new(DisabledCompletion::new("ANTHROPIC_API_KEY is not set"))
            }
        };

        let server_supervisor: Option<Arc<dyn ServerControlPort>> = if config.server.auto_start {
            Some(Arc::new(McpServerSupervisor::new(&config.server)))
        } else {
            None
        };

        let mut control = HttpDraftControl::new(
            config.server.url.clone(),
            Duration::from_secs(config.server.timeout_secs),
        );
        if let Some(supervisor) = &server_supervisor {
            control = control.with_supervisor(Arc::clone(supervisor));
        }
        let control_port: Arc<dyn DraftControlPort> = Arc::new(control);

        let generator = Arc::new(PlanGenerator::new(
            completion_port,
            config.anthropic.max_tokens,
            config.anthropic.analysis_max_tokens,
        ));
        let executor = Arc::new(PlanExecutor::new(
            Arc::clone(&control_port),
            Arc::new(PlaceholderSubtitles),
            config.paths.music_dir.clone(),
        ));

        let edit_interactor = Arc::new(EditInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&sampler_port),
            Arc::clone(&control_port),
            server_supervisor.clone(),
            Arc::clone(&generator),
            executor,
            config.paths.drafts_folder(),
        ));

        let analyze_interactor = Arc::new(AnalyzeInteractor::new(
            Arc::clone(&probe_port),
            sampler_port,
            generator,
        ));

        let server_interactor = Arc::new(ServerInteractor::new(
            control_port,
            probe_port,
            config.server.url.clone(),
            config.server.mcp_path.clone(),
            api_key_configured,
        ));

        Self {
            edit_interactor,
            analyze_interactor,
            server_interactor,
            server_supervisor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn edit_interactor(&self) -> Arc<EditInteractor> {
        Arc::clone(&self.edit_interactor)
    }

    fn analyze_interactor(&self) -> Arc<AnalyzeInteractor> {
        Arc::clone(&self.analyze_interactor)
    }

    fn server_interactor(&self) -> Arc<ServerInteractor> {
        Arc::clone(&self.server_interactor)
    }

    fn server_supervisor(&self) -> Option<Arc<dyn ServerControlPort>> {
        self.server_supervisor.clone()
    }
}
