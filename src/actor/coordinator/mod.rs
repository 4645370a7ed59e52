//! Actor Coordinator - Wires up the Mod Sync Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates the hub queue
//! - Starts the WebSocket acceptor
//! - Runs the actors until shutdown

mod runtime;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::hub::HubActor;
use super::messages::HubMsg;
use crate::compiler::{ScriptCompiler, TypeScriptCompiler};
use crate::config::SyncConfig;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SyncConfig>,
    compiler: Arc<dyn ScriptCompiler>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create from Arc<SyncConfig>.
    pub fn with_config(config: Arc<SyncConfig>) -> Self {
        Self {
            config,
            compiler: Arc::new(TypeScriptCompiler::new()),
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (hub_tx, hub_rx) = mpsc::channel::<HubMsg>(CHANNEL_BUFFER);
        let root = self.config.watch.root.clone();

        // Watcher first: nothing may change unseen once observers can connect
        let fs_actor = FsActor::new(root.clone(), self.config.watch.debounce(), hub_tx.clone())
            .with_context(|| format!("failed to watch {}", root.display()))?;

        let addr = SocketAddr::new(self.config.serve.interface, self.config.serve.port);
        let bound = crate::reload::server::start_ws_server(addr, hub_tx.clone())?;
        crate::log!("serve"; "listening on ws://{}", bound);
        crate::log!("watch"; "watching {}", root.display());

        let hub_actor = HubActor::new(hub_rx, root, Arc::clone(&self.compiler));

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, hub_actor, hub_tx, shutdown_rx).await?;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
