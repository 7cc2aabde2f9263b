mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::UiManager;
use clap::Parser;
use tokio::task;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    if cli.threads == Some(0) {
        return Err(CliError::Argument(
            "--threads must be at least 1".to_string(),
        ));
    }

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    let command_result = async {
        info!(
            "🚀 Voxfield CLI v{} starting up.",
            env!("CARGO_PKG_VERSION")
        );
        debug!("Full CLI arguments parsed: {:?}", &cli);

        match cli.command {
            Commands::Model(args) => {
                info!("Dispatching to 'model' command.");
                commands::model::run(args)
            }
            Commands::Forward(args) => {
                info!("Dispatching to 'forward' command.");
                commands::forward::run(args, cli.threads, ui_sender).await
            }
            Commands::Survey(args) => {
                info!("Dispatching to 'survey' command.");
                commands::survey::run(args, cli.threads, ui_sender).await
            }
        }
    }
    .await;

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager may have already exited before shutdown signal.");
    }

    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
        }
    }

    command_result
}
