//! CLI module for capcut-cli
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::{CliOverrides, DEFAULT_CONFIG_PATH};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

pub mod args;
pub mod commands;

/// CapCut automation CLI
///
/// Probes a source video, asks a language model for an editing plan (falling back
/// to built-in rules), and replays the plan against a CapCut MCP server to produce
/// a draft project.
#[derive(Parser, Debug)]
#[command(name = "capcut-cli")]
#[command(about = "AI-assisted CapCut draft generation from raw footage")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Enable debug logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// CapCut MCP server URL
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Start the local CapCut MCP server when it is not running
    #[arg(long, global = true)]
    pub start_server: bool,

    /// Anthropic model used for analysis and planning
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: if self.verbose {
                LogLevel::Debug
            } else {
                self.log_level
            },
            format: if self.json_logs {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
        }
    }

    /// Config file path and whether the user named it
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }

    pub fn overrides(&self) -> CliOverrides {
        let port_url = match &self.command {
            Commands::CheckServer(args) => args.port.map(|port| format!("http://localhost:{}", port)),
            _ => None,
        };
        CliOverrides {
            server_url: port_url.or_else(|| self.server_url.clone()),
            start_server: self.start_server,
            model: self.model.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a CapCut draft from one video
    Edit(args::EditArgs),
    /// Create drafts for every video in a directory
    Batch(args::BatchArgs),
    /// Choose editing options interactively, then edit
    Interactive(args::InteractiveArgs),
    /// Analyze a video and suggest how to edit it
    Analyze(args::AnalyzeArgs),
    /// Check that the CapCut MCP server is reachable
    CheckServer(args::CheckServerArgs),
    /// Create the default directories and configuration file
    Setup(args::SetupArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from([
            "capcut-cli",
            "edit",
            "clip.mp4",
            "--style",
            "vlog",
            "--duration",
            "1:30",
            "--add-music",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.logging().level, LogLevel::Debug);
        let Commands::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.style, "vlog");
        assert_eq!(args.duration.as_deref(), Some("1:30"));
        assert!(args.add_music);
        assert_eq!(args.quality, "1080p");
    }

    #[test]
    fn test_rejects_unknown_style() {
        assert!(Cli::try_parse_from(["capcut-cli", "edit", "a.mp4", "--style", "noir"]).is_err());
    }

    #[test]
    fn test_check_server_port_overrides_url() {
        let cli = Cli::try_parse_from(["capcut-cli", "check-server", "--port", "9100"]).unwrap();
        assert_eq!(
            cli.overrides().server_url.as_deref(),
            Some("http://localhost:9100")
        );
        assert_eq!(cli.config_path(), (PathBuf::from(DEFAULT_CONFIG_PATH), false));
    }
}
