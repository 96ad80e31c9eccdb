// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::model::*;
use crate::error::{CompletionError, ControlError, ProbeError};

/// Port for reading source video metadata
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, ProbeError>;

    /// Whether the underlying tool can be run at all
    async fn tool_available(&self) -> bool {
        true
    }
}

/// Port for best-effort content sampling; `None` means no content hints
#[async_trait]
pub trait SamplerPort: Send + Sync {
    async fn sample(&self, path: &Path, info: &VideoInfo) -> Option<ContentSample>;
}

/// Single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Port for the LLM completion backend
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Send one request and return the reply text
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Editing-control server endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEndpoint {
    AddVideo,
    AddText,
    AddAudio,
    AddSubtitle,
    AddEffect,
    AddSticker,
    SaveDraft,
}

impl ControlEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            ControlEndpoint::AddVideo => "/add_video",
            ControlEndpoint::AddText => "/add_text",
            ControlEndpoint::AddAudio => "/add_audio",
            ControlEndpoint::AddSubtitle => "/add_subtitle",
            ControlEndpoint::AddEffect => "/add_effect",
            ControlEndpoint::AddSticker => "/add_sticker",
            ControlEndpoint::SaveDraft => "/save_draft",
        }
    }

    /// Endpoints a usable server must expose
    pub fn critical() -> [ControlEndpoint; 3] {
        [
            ControlEndpoint::AddVideo,
            ControlEndpoint::AddText,
            ControlEndpoint::SaveDraft,
        ]
    }
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Port for the editing-control server
#[async_trait]
pub trait DraftControlPort: Send + Sync {
    /// POST a JSON body to an endpoint and return the decoded reply
    async fn call(&self, endpoint: ControlEndpoint, body: Value) -> Result<Value, ControlError>;

    /// Liveness check
    async fn is_alive(&self) -> bool;

    /// Whether an endpoint exists; any well-formed reply counts
    async fn endpoint_responds(&self, _endpoint: ControlEndpoint) -> bool {
        self.is_alive().await
    }
}

/// Port for lifecycle control of a local editing-control server
#[async_trait]
pub trait ServerControlPort: Send + Sync {
    async fn start(&self) -> Result<(), ControlError>;
    async fn stop(&self);
    async fn restart(&self) -> Result<(), ControlError>;
}

/// Port for subtitle generation
#[async_trait]
pub trait SubtitlePort: Send + Sync {
    async fn subtitles(&self, video: &Path, target_duration: f64) -> Vec<Subtitle>;
}
