mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod table;
mod ui;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::{UiEvent, UiManager};
use clap::Parser;
use std::process::ExitCode;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (ui_manager, ui_sender, shutdown) = UiManager::new();
    let ui_task = tokio::spawn(ui_manager.run());

    let result = match prepare(&cli) {
        Ok(()) => dispatch(cli, ui_sender).await,
        Err(e) => Err(e),
    };
    let result = stop_ui(shutdown, ui_task).await.and(result);

    match result {
        Ok(()) => {
            info!("molsieve finished successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("molsieve failed: {}", e);
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs logging and the panic report hook.
fn prepare(cli: &Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |info| {
        error!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

async fn dispatch(cli: Cli, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("molsieve v{} starting.", env!("CARGO_PKG_VERSION"));
    debug!("Parsed arguments: {:?}", &cli);

    match cli.command {
        Commands::Screen(args) => commands::screen::run(args, cli.threads, ui_sender).await,
    }
}

async fn stop_ui(shutdown: watch::Sender<bool>, ui_task: JoinHandle<()>) -> Result<()> {
    if shutdown.send(true).is_err() {
        warn!("UI task exited before the shutdown signal.");
    }
    ui_task
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI task failed: {e}")))
}
