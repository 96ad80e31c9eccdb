//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::toml_config::TomlConfigStore;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:9000";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub anthropic: AnthropicConfig,
    pub tools: ToolsConfig,
    pub paths: PathsConfig,
    pub batch: BatchConfig,
}

/// CapCut MCP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Start the local server when it is not reachable
    pub auto_start: bool,
    pub mcp_path: PathBuf,
    pub python: String,
    pub startup_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: 30,
            auto_start: false,
            mcp_path: PathBuf::from("capcut-mcp"),
            python: "python3".to_string(),
            startup_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Port of the server URL's authority, else the scheme default
    pub fn port(&self) -> u16 {
        let (scheme, rest) = self.url.split_once("://").unwrap_or(("http", self.url.as_str()));
        let authority = rest.split(&['/', '?', '#'][..]).next().unwrap_or(rest);
        let authority = authority.rsplit('@').next().unwrap_or(authority);

        authority
            .rsplit_once(':')
            .filter(|(host, _)| !host.starts_with('[') || host.ends_with(']'))
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or(if scheme.eq_ignore_ascii_case("https") { 443 } else { 80 })
    }
}

/// Completion API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub model: String,
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub analysis_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: "https://api.anthropic.com".to_string(),
            api_key: None,
            max_tokens: 2000,
            analysis_max_tokens: 1500,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffprobe_path: String,
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub output_dir: PathBuf,
    pub music_dir: PathBuf,
    /// CapCut drafts folder; detected from the usual install locations when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drafts_folder: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/drafts"),
            music_dir: PathBuf::from("assets/music"),
            drafts_folder: None,
        }
    }
}

impl PathsConfig {
    /// Configured drafts folder, else the detected one
    pub fn drafts_folder(&self) -> PathBuf {
        self.drafts_folder
            .clone()
            .unwrap_or_else(detect_drafts_folder)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub parallel_jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallel_jobs: 1 }
    }
}

/// Overrides taken from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server_url: Option<String>,
    pub start_server: bool,
    pub model: Option<String>,
}

impl AppConfig {
    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut take = |name: &str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_some() {
                debug!("Found environment override: {}", name);
                applied += 1;
            }
            value
        };

        if let Some(key) = take("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = Some(key);
        }
        if let Some(model) = take("ANTHROPIC_MODEL") {
            self.anthropic.model = model;
        }
        if let Some(url) = take("CAPCUT_MCP_URL") {
            self.server.url = url;
        }
        if let Some(folder) = take("CAPCUT_DRAFTS_FOLDER") {
            self.paths.drafts_folder = Some(PathBuf::from(folder));
        }
        if let Some(ffprobe) = take("FFPROBE_PATH") {
            self.tools.ffprobe_path = ffprobe;
        }

        applied
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, overrides: &CliOverrides) -> usize {
        let mut applied = 0;
        if let Some(url) = &overrides.server_url {
            self.server.url = url.clone();
            applied += 1;
        }
        if overrides.start_server {
            self.server.auto_start = true;
            applied += 1;
        }
        if let Some(model) = &overrides.model {
            self.anthropic.model = model.clone();
            applied += 1;
        }
        applied
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.server.url.starts_with("http://") && !self.server.url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "server.url must be an http(s) URL, got '{}'",
                self.server.url
            )));
        }
        if self.server.timeout_secs == 0
            || self.anthropic.timeout_secs == 0
            || self.tools.timeout_secs == 0
        {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.batch.parallel_jobs == 0 {
            return Err(ConfigError::Invalid("batch.parallel_jobs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Build the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(
    config_path: &Path,
    explicit_path: bool,
    overrides: &CliOverrides,
) -> Result<AppConfig, ConfigError> {
    info!("Initializing configuration hierarchy");

    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let store = TomlConfigStore::new(config_path);
    let mut config = match store.load()? {
        Some(config) => {
            info!("Loaded configuration from: {}", config_path.display());
            config
        }
        None if explicit_path => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            });
        }
        None => {
            debug!("No config file at {}, using defaults", config_path.display());
            AppConfig::default()
        }
    };

    let env_overrides = config.apply_env(|name| std::env::var(name).ok());
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = config.apply_cli(overrides);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate()?;
    Ok(config)
}

/// Candidate CapCut project folders relative to the home directory
fn drafts_folder_candidates(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join("AppData/Local/CapCut/User Data/Projects"),
        home.join("Documents/CapCut"),
        home.join("Library/Containers/com.lemon.lvoverseas/Data/Library/Application Support/CapCut/Projects"),
        home.join("Movies/CapCut"),
        home.join(".capcut/projects"),
    ]
}

/// First existing CapCut project folder, else `~/Videos/CapCut`
pub fn detect_drafts_folder() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    detect_drafts_folder_in(&home)
}

fn detect_drafts_folder_in(home: &Path) -> PathBuf {
    drafts_folder_candidates(home)
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| home.join("Videos/CapCut"))
}
