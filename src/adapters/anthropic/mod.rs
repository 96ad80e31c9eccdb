//! Anthropic Messages API adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config_initialization::AnthropicConfig;
use crate::error::CompletionError;
use crate::ports::{CompletionPort, CompletionRequest};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Completion backend calling `POST {api_base}/v1/messages`
pub struct AnthropicCompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl AnthropicCompletion {
    pub fn new(config: &AnthropicConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/v1/messages", config.api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, CompletionError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    if text.trim().is_empty() {
        Err(CompletionError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl CompletionPort for AnthropicCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        debug!(target: "llm", model = %self.model, max_tokens = request.max_tokens, "Sending completion request");
        match timeout(self.timeout, self.send(&request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(target: "llm", "Completion request exceeded {:?}", self.timeout);
                Err(CompletionError::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

/// Backend used when no API key is configured; every request fails fast
pub struct DisabledCompletion {
    reason: String,
}

impl DisabledCompletion {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CompletionPort for DisabledCompletion {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::NotConfigured(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 1500,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "m",
                "max_tokens": 1500,
                "system": "sys",
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"cuts\": "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "[]}"}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "{\"cuts\": []}");
    }

    #[test]
    fn test_extract_text_empty() {
        let response: MessagesResponse =
            serde_json::from_value(serde_json::json!({"content": []})).unwrap();
        assert!(matches!(extract_text(response), Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let config = AnthropicConfig {
            api_base: "https://example.test/".to_string(),
            ..AnthropicConfig::default()
        };
        let backend = AnthropicCompletion::new(&config, "key");
        assert_eq!(backend.endpoint, "https://example.test/v1/messages");
    }

    #[tokio::test]
    async fn test_disabled_completion_fails_fast() {
        let backend = DisabledCompletion::new("ANTHROPIC_API_KEY not set");
        let err = backend
            .complete(CompletionRequest {
                system: String::new(),
                prompt: String::new(),
                max_tokens: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::NotConfigured(_)));
    }
}
