use anyhow::Result;
use clap::{Parser, Subcommand};
use finsnap::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for finsnap::AppCommand {
    fn from(cmd: Commands) -> finsnap::AppCommand {
        match cmd {
            Commands::Send => finsnap::AppCommand::Send,
            Commands::Preview => finsnap::AppCommand::Preview,
            Commands::Status => finsnap::AppCommand::Status,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch market data and email the report (default)
    Send,
    /// Print the report without sending it
    Preview,
    /// Show the stored monthly series value
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Send) {
        Commands::Setup => finsnap::cli::setup::setup(),
        cmd => finsnap::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
