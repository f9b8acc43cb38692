pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Send,
    Preview,
    Status,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Financial snapshot starting...");

    let config = match config_path {
        Some(path) => crate::core::config::AppConfig::load_from_path(path)?,
        None => crate::core::config::AppConfig::load()?,
    };
    debug!(
        instruments = config.instruments.len(),
        recipients = config.recipients.len(),
        "Loaded config"
    );

    match command {
        AppCommand::Send => cli::send::run(&config).await,
        AppCommand::Preview => cli::preview::run(&config).await,
        AppCommand::Status => cli::status::run(&config),
    }
}
