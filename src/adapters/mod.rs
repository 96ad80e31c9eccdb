// Adapters - External system implementations

pub mod anthropic;
pub mod control_http;
pub mod probe_ffprobe;
pub mod sampler_libav;
pub mod server_supervisor;
pub mod subtitles;
pub mod toml_config;

// Re-export adapters
pub use anthropic::{AnthropicCompletion, DisabledCompletion};
pub use control_http::HttpDraftControl;
pub use probe_ffprobe::FFprobeAdapter;
#[cfg(feature = "libav")]
pub use sampler_libav::LibavSampler;
pub use sampler_libav::DisabledSampler;
pub use server_supervisor::McpServerSupervisor;
pub use subtitles::PlaceholderSubtitles;
pub use toml_config::TomlConfigStore;
