//! Error handling module for the CapCut CLI

use thiserror::Error;

/// Failure to read metadata from a source video
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },

    /// The ffprobe binary could not be started
    #[error("Failed to launch ffprobe ({tool}): {message}")]
    ToolMissing { tool: String, message: String },

    /// ffprobe ran but reported failure
    #[error("ffprobe exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },

    /// ffprobe did not finish in time
    #[error("ffprobe did not finish within {seconds}s")]
    Timeout { seconds: u64 },

    /// ffprobe produced output we could not read
    #[error("Malformed ffprobe output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// The container has no video stream
    #[error("No video stream found in {path}")]
    NoVideoStream { path: String },

    /// Duration, dimensions or frame rate are unusable
    #[error("Invalid video metadata: {message}")]
    InvalidMetadata { message: String },
}

/// Failure of a single LLM completion request
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No API key available
    #[error("completion backend not configured: {0}")]
    NotConfigured(String),

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request exceeded its deadline
    #[error("completion timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The reply carried no text content
    #[error("completion returned no text")]
    EmptyResponse,
}

/// Failure of a call against the editing-control server
#[derive(Error, Debug)]
pub enum ControlError {
    /// Connection refused or otherwise unreachable
    #[error("CapCut MCP server unavailable at {url}: {message}")]
    ServerUnavailable { url: String, message: String },

    /// The call exceeded its deadline
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("bad request to {endpoint}: {message}")]
    BadRequest { endpoint: String, message: String },

    #[error("endpoint not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("server error on {endpoint}: {message}")]
    Server { endpoint: String, message: String },

    #[error("unexpected status {status} from {endpoint}: {message}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Any other transport failure
    #[error("transport error on {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The local server process could not be started
    #[error("failed to launch CapCut MCP server: {message}")]
    Launch { message: String },
}

impl ControlError {
    /// True when the failure means nothing is listening
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ControlError::ServerUnavailable { .. })
    }
}

/// Configuration loading or persistence failure
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration value: {0}")]
    Invalid(String),
}
