use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::hub::HubActor;
use crate::actor::messages::HubMsg;

/// Shutdown signal poll interval.
const SIGNAL_POLL: Duration = Duration::from_millis(100);

/// Time the hub gets to close observers.
const HUB_GRACE: Duration = Duration::from_millis(500);

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    hub: HubActor,
    hub_tx: mpsc::Sender<HubMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let mut hub_handle = tokio::spawn(async move { hub.run().await });
    let fs_handle = tokio::spawn(async move { fs.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if hub_handle.is_finished() {
                crate::log!("actor"; "hub stopped unexpectedly");
                break;
            }
            tokio::time::sleep(SIGNAL_POLL).await;
        }
    } else {
        tokio::select! {
            _ = &mut hub_handle => {}
            _ = fs_handle => {}
        }
    }

    crate::debug!("actor"; "sending shutdown to hub");
    let _ = hub_tx.send(HubMsg::Shutdown).await;
    drop(hub_tx);

    let _ = tokio::time::timeout(HUB_GRACE, hub_handle).await;

    Ok(())
}
