//! Lifecycle management for a local CapCut MCP server process

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::adapters::control_http::probe_liveness;
use crate::config_initialization::ServerConfig;
use crate::error::ControlError;
use crate::ports::ServerControlPort;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const STOP_GRACE: Duration = Duration::from_secs(5);
const RESTART_PAUSE: Duration = Duration::from_secs(2);

/// Starts `python main.py` inside the capcut-mcp checkout and waits for it to answer
pub struct McpServerSupervisor {
    client: reqwest::Client,
    base_url: String,
    port: u16,
    mcp_path: PathBuf,
    python: String,
    startup_timeout: Duration,
    child: Mutex<Option<Child>>,
}

impl McpServerSupervisor {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            port: config.port(),
            mcp_path: config.mcp_path.clone(),
            python: config.python.clone(),
            startup_timeout: Duration::from_secs(config.startup_timeout_secs),
            child: Mutex::new(None),
        }
    }

    pub async fn is_running(&self) -> bool {
        probe_liveness(&self.client, &self.base_url).await
    }

    fn launch_error(message: impl Into<String>) -> ControlError {
        ControlError::Launch {
            message: message.into(),
        }
    }

    async fn wait_until_ready(&self) -> Result<(), ControlError> {
        let attempts = self.startup_timeout.as_secs().max(1);
        for _ in 0..attempts {
            sleep(POLL_INTERVAL).await;
            if self.is_running().await {
                info!("CapCut MCP server started on port {}", self.port);
                return Ok(());
            }

            let mut guard = self.child.lock().await;
            if let Some(child) = guard.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    guard.take();
                    return Err(Self::launch_error(format!(
                        "server process exited early with {}",
                        status
                    )));
                }
            }
        }

        self.stop().await;
        Err(Self::launch_error(format!(
            "server did not answer within {}s",
            self.startup_timeout.as_secs()
        )))
    }
}

#[async_trait]
impl ServerControlPort for McpServerSupervisor {
    async fn start(&self) -> Result<(), ControlError> {
        if self.is_running().await {
            info!("CapCut MCP server already running at {}", self.base_url);
            return Ok(());
        }

        if !self.mcp_path.is_dir() {
            return Err(Self::launch_error(format!(
                "capcut-mcp not found at {} (clone https://github.com/fancyboi999/capcut-mcp.git)",
                self.mcp_path.display()
            )));
        }
        if !self.mcp_path.join("main.py").is_file() {
            return Err(Self::launch_error(format!(
                "main.py not found in {}",
                self.mcp_path.display()
            )));
        }

        info!("Starting CapCut MCP server from {}", self.mcp_path.display());
        let child = Command::new(&self.python)
            .arg("main.py")
            .current_dir(&self.mcp_path)
            .env("PORT", self.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::launch_error(format!("failed to spawn {}: {}", self.python, e)))?;

        *self.child.lock().await = Some(child);
        self.wait_until_ready().await
    }

    async fn stop(&self) {
        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };

        if let Err(e) = child.start_kill() {
            warn!("Error stopping CapCut MCP server: {}", e);
            return;
        }
        match timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(status)) => info!("CapCut MCP server stopped ({})", status),
            Ok(Err(e)) => warn!("Error waiting for CapCut MCP server: {}", e),
            Err(_) => warn!("CapCut MCP server did not exit within {:?}", STOP_GRACE),
        }
    }

    async fn restart(&self) -> Result<(), ControlError> {
        self.stop().await;
        sleep(RESTART_PAUSE).await;
        self.start().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mcp_path: PathBuf) -> ServerConfig {
        ServerConfig {
            url: "http://127.0.0.1:9".to_string(),
            mcp_path,
            startup_timeout_secs: 1,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_requires_checkout() {
        let dir = tempfile::TempDir::new().unwrap();
        let supervisor = McpServerSupervisor::new(&config(dir.path().join("missing")));

        let err = supervisor.start().await.unwrap_err();
        assert!(matches!(err, ControlError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_start_requires_main_py() {
        let dir = tempfile::TempDir::new().unwrap();
        let supervisor = McpServerSupervisor::new(&config(dir.path().to_path_buf()));

        let err = supervisor.start().await.unwrap_err();
        assert!(err.to_string().contains("main.py"));
    }

    #[tokio::test]
    async fn test_stop_without_child_is_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let supervisor = McpServerSupervisor::new(&config(dir.path().to_path_buf()));
        supervisor.stop().await;
    }
}
