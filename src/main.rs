//! modsync - live mod sync server.
//!
//! Watches a mods directory, compiles TypeScript scripts, and streams the
//! resulting state to WebSocket observers.

mod actor;
mod classify;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod metadata;
mod model;
mod reload;
mod snapshot;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use actor::Coordinator;
use cli::Cli;
use config::SyncConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(SyncConfig::load(&cli)?);
    crate::debug!("config"; "{}", config.config_path.display());

    serve(config)
}

/// Run the actor system until Ctrl+C.
fn serve(config: Arc<SyncConfig>) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    core::register_shutdown(shutdown_tx);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(
        Coordinator::with_config(config)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )?;

    // Acceptor and reader threads are detached; do not wait for them
    runtime.shutdown_timeout(std::time::Duration::from_millis(200));
    Ok(())
}
