// Server interactor - Health report for the editing-control server

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::ports::{ControlEndpoint, DraftControlPort, ProbePort};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerHealth {
    /// Alive and every critical endpoint responds
    Healthy,
    /// Alive but some critical endpoint is missing
    Degraded,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointStatus {
    pub endpoint: String,
    pub available: bool,
}

/// Local prerequisites for a working pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    /// The capcut-mcp checkout exists
    pub capcut_mcp_exists: bool,
    /// `ffprobe -version` runs successfully
    pub ffprobe_available: bool,
    pub api_key_configured: bool,
}

impl DependencyStatus {
    /// Missing pieces the pipeline cannot work without
    pub fn missing_required(&self) -> bool {
        !self.ffprobe_available
    }
}

/// Inspect the local prerequisites
pub async fn check_dependencies(
    probe_port: &dyn ProbePort,
    mcp_path: &Path,
    api_key_configured: bool,
) -> DependencyStatus {
    let status = DependencyStatus {
        capcut_mcp_exists: mcp_path.is_dir(),
        ffprobe_available: probe_port.tool_available().await,
        api_key_configured,
    };
    if !status.ffprobe_available {
        warn!("ffprobe is not available, videos cannot be probed");
    }
    if !status.capcut_mcp_exists {
        warn!("capcut-mcp not found at {}", mcp_path.display());
    }
    status
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub url: String,
    pub health: ServerHealth,
    pub endpoints: Vec<EndpointStatus>,
    pub dependencies: DependencyStatus,
}

pub struct ServerInteractor {
    control_port: Arc<dyn DraftControlPort>,
    probe_port: Arc<dyn ProbePort>,
    url: String,
    mcp_path: PathBuf,
    api_key_configured: bool,
}

impl ServerInteractor {
    pub fn new(
        control_port: Arc<dyn DraftControlPort>,
        probe_port: Arc<dyn ProbePort>,
        url: impl Into<String>,
        mcp_path: impl Into<PathBuf>,
        api_key_configured: bool,
    ) -> Self {
        Self {
            control_port,
            probe_port,
            url: url.into(),
            mcp_path: mcp_path.into(),
            api_key_configured,
        }
    }

    pub async fn check(&self) -> ServerStatus {
        let dependencies = check_dependencies(
            self.probe_port.as_ref(),
            &self.mcp_path,
            self.api_key_configured,
        )
        .await;

        if !self.control_port.is_alive().await {
            warn!("CapCut MCP server at {} is not responding", self.url);
            return ServerStatus {
                url: self.url.clone(),
                health: ServerHealth::Down,
                endpoints: Vec::new(),
                dependencies,
            };
        }

        let mut endpoints = Vec::new();
        for endpoint in ControlEndpoint::critical() {
            let available = self.control_port.endpoint_responds(endpoint).await;
            if !available {
                warn!("Endpoint {} is not available", endpoint);
            }
            endpoints.push(EndpointStatus {
                endpoint: endpoint.path().to_string(),
                available,
            });
        }

        let health = if endpoints.iter().all(|e| e.available) {
            ServerHealth::Healthy
        } else {
            ServerHealth::Degraded
        };
        info!("CapCut MCP server at {} is {:?}", self.url, health);

        ServerStatus {
            url: self.url.clone(),
            health,
            endpoints,
            dependencies,
        }
    }
}
