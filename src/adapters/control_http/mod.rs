//! HTTP client for the CapCut MCP control server

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ControlError;
use crate::ports::{ControlEndpoint, DraftControlPort, ServerControlPort};

const LIVENESS_TIMEOUT: Duration = Duration::from_secs(2);
const ENDPOINT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// True when the server answers `GET /health`, or `GET /` as a fallback
pub async fn probe_liveness(client: &reqwest::Client, base_url: &str) -> bool {
    for path in ["/health", "/"] {
        let url = format!("{}{}", base_url, path);
        match client.get(&url).timeout(LIVENESS_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => return true,
            Ok(response) => debug!("{} answered {}", url, response.status()),
            Err(e) => {
                debug!("{} unreachable: {}", url, e);
                if e.is_connect() {
                    return false;
                }
            }
        }
    }
    false
}

/// Map a response status and body onto the control-call result
pub fn interpret_response(
    endpoint: ControlEndpoint,
    status: u16,
    body: &str,
) -> Result<Value, ControlError> {
    let endpoint_name = endpoint.path().to_string();
    match status {
        200..=299 => Ok(serde_json::from_str(body)
            .unwrap_or_else(|_| json!({"success": true, "response": body}))),
        400 => Err(ControlError::BadRequest {
            endpoint: endpoint_name,
            message: body.to_string(),
        }),
        404 => Err(ControlError::NotFound {
            endpoint: endpoint_name,
        }),
        500 => Err(ControlError::Server {
            endpoint: endpoint_name,
            message: body.to_string(),
        }),
        other => Err(ControlError::UnexpectedStatus {
            endpoint: endpoint_name,
            status: other,
            message: body.to_string(),
        }),
    }
}

/// reqwest-backed implementation of [`DraftControlPort`]
pub struct HttpDraftControl {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    supervisor: Option<Arc<dyn ServerControlPort>>,
}

impl HttpDraftControl {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            supervisor: None,
        }
    }

    /// Restart the server through `supervisor` once when a call cannot connect
    pub fn with_supervisor(mut self, supervisor: Arc<dyn ServerControlPort>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport_error(&self, endpoint: ControlEndpoint, err: reqwest::Error) -> ControlError {
        if err.is_timeout() {
            ControlError::Timeout {
                endpoint: endpoint.path().to_string(),
            }
        } else if err.is_connect() {
            ControlError::ServerUnavailable {
                url: self.base_url.clone(),
                message: err.to_string(),
            }
        } else {
            ControlError::Transport {
                endpoint: endpoint.path().to_string(),
                message: err.to_string(),
            }
        }
    }

    async fn post(&self, endpoint: ControlEndpoint, body: &Value) -> Result<Value, ControlError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_transport_error(endpoint, e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(endpoint, e))?;
        interpret_response(endpoint, status, &text)
    }
}

#[async_trait]
impl DraftControlPort for HttpDraftControl {
    async fn call(&self, endpoint: ControlEndpoint, body: Value) -> Result<Value, ControlError> {
        debug!(endpoint = %endpoint, "POST");
        match self.post(endpoint, &body).await {
            Err(err) if err.is_connection_failure() => match &self.supervisor {
                Some(supervisor) => {
                    warn!("Connection to {} failed, restarting CapCut MCP server", self.base_url);
                    supervisor.restart().await?;
                    self.post(endpoint, &body).await
                }
                None => Err(err),
            },
            other => other,
        }
    }

    async fn is_alive(&self) -> bool {
        probe_liveness(&self.client, &self.base_url).await
    }

    async fn endpoint_responds(&self, endpoint: ControlEndpoint) -> bool {
        let url = format!("{}{}", self.base_url, endpoint.path());
        match self
            .client
            .post(&url)
            .json(&json!({}))
            .timeout(ENDPOINT_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => matches!(response.status().as_u16(), 200 | 400 | 422),
            Err(_) => false,
        }
    }
}
