//! capcut-cli
//!
//! Command-line front end for AI-assisted CapCut draft generation.
//!
//! # Usage
//!
//! ```bash
//! capcut-cli setup
//! capcut-cli check-server
//! capcut-cli edit holiday.mp4 --style vlog --duration 01:00 --add-music
//! capcut-cli batch ./footage --style social_media --parallel 2
//! capcut-cli analyze holiday.mp4 --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use capcut_cli::app::{AppContainer, DefaultAppContainer};
use capcut_cli::cli::{commands, Cli, Commands};
use capcut_cli::config_initialization::initialize_configuration;
use capcut_cli::utils::logging::{init_logging, log_system_info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.logging());
    log_system_info();

    let (config_path, explicit) = cli.config_path();
    let overrides = cli.overrides();

    // Setup runs before any configuration exists
    let command = match cli.command {
        Commands::Setup(args) => return commands::setup(&config_path, args).await,
        other => other,
    };

    let config = initialize_configuration(&config_path, explicit, &overrides)
        .context("Failed to load configuration")?;
    let container = DefaultAppContainer::new(&config);

    let outcome = tokio::select! {
        result = run(&container, &config, command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping");
            Err(anyhow::anyhow!("Interrupted"))
        }
    };

    if let Some(supervisor) = container.server_supervisor() {
        supervisor.stop().await;
    }

    outcome
}

async fn run(
    container: &DefaultAppContainer,
    config: &capcut_cli::AppConfig,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Edit(args) => {
            info!("Executing edit command");
            commands::edit(container, args).await
        }
        Commands::Batch(args) => {
            info!("Executing batch command");
            commands::batch(container, config, args).await
        }
        Commands::Interactive(args) => {
            info!("Executing interactive command");
            commands::interactive(container, args).await
        }
        Commands::Analyze(args) => {
            info!("Executing analyze command");
            commands::analyze(container, args).await
        }
        Commands::CheckServer(args) => {
            info!("Executing check-server command");
            commands::check_server(container, args).await
        }
        Commands::Setup(_) => Ok(()),
    }
}
