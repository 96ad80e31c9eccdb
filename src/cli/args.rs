//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{AspectRatio, EditingStyle, Quality};

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Editing style
    #[arg(short, long, default_value = "auto", value_parser = EditingStyle::CHOICES)]
    pub style: String,

    /// Target duration (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Draft name (default: <input stem>_edited)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Add style-matched background music
    #[arg(long)]
    pub add_music: bool,

    /// Add automatic subtitles
    #[arg(long)]
    pub auto_subtitles: bool,

    /// Output quality
    #[arg(long, default_value = "1080p", value_parser = Quality::CHOICES)]
    pub quality: String,

    /// Output aspect ratio
    #[arg(long, default_value = "16:9", value_parser = AspectRatio::CHOICES)]
    pub aspect_ratio: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory containing videos
    pub input_dir: PathBuf,

    /// Editing style applied to every video
    #[arg(short, long, default_value = "auto", value_parser = EditingStyle::CHOICES)]
    pub style: String,

    /// Drafts folder for the results (default: configured CapCut drafts folder)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Videos processed at the same time (default: batch.parallel_jobs)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Include videos in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the interactive command
#[derive(Args, Debug)]
pub struct InteractiveArgs {
    /// Input video file path
    pub input: PathBuf,
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check-server command
#[derive(Args, Debug)]
pub struct CheckServerArgs {
    /// Check a server on localhost at this port instead of the configured URL
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,

    /// Store this Anthropic API key in .env
    #[arg(long)]
    pub api_key: Option<String>,
}
