//! capcut-cli library
//!
//! Turns raw footage into CapCut draft projects: probe the video, optionally sample
//! its frames, ask a language model for an editing plan (with a rule-based fallback),
//! repair the plan against the real duration, and replay it on a CapCut MCP server.

pub mod adapters;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, EditRequest, EditResponse};
pub use config_initialization::AppConfig;
pub use domain::errors::DomainError;
pub use domain::model::{EditOptions, EditingPlan, EditingStyle, PlanOutcome, VideoInfo};
pub use error::{CompletionError, ConfigError, ControlError, ProbeError};
